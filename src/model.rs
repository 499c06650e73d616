//! The external model collaborator: tasks, options, outputs and the
//! backend traits an [`Analyzer`](crate::Analyzer) delegates inference to.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerResult;

/// Options forwarded verbatim to a pipeline call.
pub type PipelineOptions = serde_json::Map<String, serde_json::Value>;

/// Sentiment output exactly as the backend produced it, typically
/// `[{"label": ..., "score": ...}]`. Nested `top_k` shapes and extra keys
/// are kept as-is.
pub type SentimentResult = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    Summarization,
    SentimentAnalysis,
}

impl Task {
    /// Task name as understood by pipeline factories.
    pub const fn as_str(self) -> &'static str {
        match self {
            Task::Summarization => "summarization",
            Task::SentimentAnalysis => "sentiment-analysis",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub summary_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    Summaries(Vec<SummaryRecord>),
    Sentiment(SentimentResult),
}

/// A loaded, reusable inference handle for one task.
#[async_trait]
pub trait ModelPipeline: Send + Sync {
    async fn run(&self, input: &str, options: &PipelineOptions) -> AnalyzerResult<PipelineOutput>;
}

/// Constructs pipeline handles. Loading may be slow (weights, tokenizer) and
/// is expected to fail with [`AnalyzerError::ModelLoad`](crate::AnalyzerError::ModelLoad).
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn load_pipeline(
        &self,
        task: Task,
        model: Option<&str>,
    ) -> AnalyzerResult<Arc<dyn ModelPipeline>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names() {
        assert_eq!(Task::Summarization.to_string(), "summarization");
        assert_eq!(Task::SentimentAnalysis.as_str(), "sentiment-analysis");
        assert_eq!(
            serde_json::to_value(Task::SentimentAnalysis).unwrap(),
            serde_json::json!("sentiment-analysis")
        );
    }

    #[test]
    fn test_sentiment_result_keeps_full_precision() {
        let raw = serde_json::json!([{"label": "POSITIVE", "score": 0.9998855590830312}]);
        let output = PipelineOutput::Sentiment(raw.clone());
        let PipelineOutput::Sentiment(back) = output else {
            panic!("expected sentiment output");
        };
        assert_eq!(back, raw);
        assert_eq!(
            back[0]["score"].as_f64().unwrap().to_bits(),
            0.9998855590830312_f64.to_bits()
        );
    }
}
