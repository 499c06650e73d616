//! Pipeline adapter: normalize, delegate to the model backend, post-process.
//!
//! Every failure is logged where it surfaces and returned unchanged. There is
//! no retry, no fallback summary and no default sentiment.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::PipelineCache;
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::model::{ModelBackend, PipelineOptions, PipelineOutput, SentimentResult, Task};
use crate::normalize::{dedupe_tokens, normalize};

pub struct Analyzer {
    pipelines: PipelineCache,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn ModelBackend>, config: AnalyzerConfig) -> Self {
        Self {
            pipelines: PipelineCache::new(backend),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn is_loaded(&self, task: Task) -> bool {
        self.pipelines.is_loaded(task)
    }

    /// Normalization only, without touching the model.
    pub fn preprocess(&self, text: &str) -> String {
        normalize(text)
    }

    /// Summarize `text` and drop repeated words from the generated summary.
    pub async fn summarize(&self, text: &str) -> AnalyzerResult<String> {
        self.run_summarize(text)
            .await
            .inspect_err(|err| error!(error = %err, "error summarizing text"))
    }

    /// Classify the sentiment of `text`; the backend's scores are returned as-is.
    pub async fn sentiment_score(&self, text: &str) -> AnalyzerResult<SentimentResult> {
        self.run_sentiment(text)
            .await
            .inspect_err(|err| error!(error = %err, "error calculating sentiment score"))
    }

    async fn run_summarize(&self, text: &str) -> AnalyzerResult<String> {
        let settings = &self.config.summarization;
        let cleaned = normalize(text);
        debug!(input_len = text.len(), cleaned_len = cleaned.len(), "summarizing");

        let pipeline = self
            .pipelines
            .get(Task::Summarization, Some(settings.model.as_str()))
            .await?;
        let output = pipeline.run(&cleaned, &settings.options()).await?;
        let summary = first_summary(output)?;
        Ok(dedupe_tokens(&summary))
    }

    async fn run_sentiment(&self, text: &str) -> AnalyzerResult<SentimentResult> {
        let cleaned = normalize(text);
        debug!(input_len = text.len(), cleaned_len = cleaned.len(), "scoring sentiment");

        let pipeline = self
            .pipelines
            .get(
                Task::SentimentAnalysis,
                self.config.sentiment.model.as_deref(),
            )
            .await?;
        match pipeline.run(&cleaned, &PipelineOptions::new()).await? {
            PipelineOutput::Sentiment(scores) => Ok(scores),
            PipelineOutput::Summaries(_) => Err(AnalyzerError::model_inference(
                Task::SentimentAnalysis,
                "pipeline returned summaries instead of sentiment scores",
            )),
        }
    }
}

fn first_summary(output: PipelineOutput) -> AnalyzerResult<String> {
    match output {
        PipelineOutput::Summaries(records) => records
            .into_iter()
            .next()
            .map(|record| record.summary_text)
            .ok_or_else(|| {
                AnalyzerError::model_inference(Task::Summarization, "pipeline returned no summaries")
            }),
        PipelineOutput::Sentiment(_) => Err(AnalyzerError::model_inference(
            Task::Summarization,
            "pipeline returned sentiment scores instead of summaries",
        )),
    }
}
