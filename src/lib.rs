//! Text analysis over pretrained model pipelines.
//!
//! Three operations:
//! 1. Cleaning (lowercase, URL/email/symbol stripping, stopwords, dedup)
//! 2. Summarization (cleaned text in, deduplicated summary out)
//! 3. Sentiment scoring (cleaned text in, backend scores out unmodified)
//!
//! Inference is delegated to a [`ModelBackend`]; handles are built once per
//! task and reused. With the `python` feature the crate also builds the
//! `insight_core` extension module, driven by a Python pipeline factory.

mod analyzer;
mod cache;
pub mod config;
mod error;
pub mod model;
pub mod normalize;
pub mod stopwords;
pub mod telemetry;

#[cfg(feature = "python")]
mod python;
#[cfg(test)]
mod testing;

pub use analyzer::Analyzer;
pub use cache::PipelineCache;
// `crate::` keeps this distinct from the `config` dependency.
pub use crate::config::AnalyzerConfig;
pub use error::{AnalyzerError, AnalyzerResult};
pub use model::{
    ModelBackend, ModelPipeline, PipelineOptions, PipelineOutput, SentimentResult, SummaryRecord,
    Task,
};
pub use normalize::{dedupe_tokens, normalize};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Insight Core — native text cleaning, summarization and sentiment scoring.
#[cfg(feature = "python")]
#[pymodule]
fn insight_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Cleaning
    m.add_function(wrap_pyfunction!(python::py_normalize_text, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_dedupe_tokens, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_is_stopword, m)?)?;

    // Logging
    m.add_function(wrap_pyfunction!(python::py_init_logging, m)?)?;

    // Analyzer class and error types
    python::register(m)?;

    Ok(())
}
