//! Deterministic model backend for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::model::{
    ModelBackend, ModelPipeline, PipelineOptions, PipelineOutput, SummaryRecord, Task,
};

/// Sentiment payload returned by stub pipelines, extra key and all.
pub(crate) fn stub_sentiment() -> serde_json::Value {
    json!([{"label": "POSITIVE", "score": 0.9998855590830312, "index": 1}])
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Request {
    pub task: Task,
    pub input: String,
    pub options: PipelineOptions,
}

#[derive(Default)]
pub(crate) struct StubBackend {
    /// Raw summary text returned by the summarization pipeline; empty means no records.
    pub summary: String,
    /// Number of upcoming loads that fail.
    pub failing_loads: AtomicUsize,
    /// Number of upcoming pipeline runs that fail, shared by all pipelines.
    pub failing_runs: Arc<AtomicUsize>,
    /// Pipelines answer with the other task's output shape.
    pub swap_outputs: bool,
    pub load_delay: Option<Duration>,
    pub loads: Mutex<Vec<(Task, Option<String>)>>,
    pub requests: Arc<Mutex<Vec<Request>>>,
}

impl StubBackend {
    pub fn with_summary(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    async fn load_pipeline(
        &self,
        task: Task,
        model: Option<&str>,
    ) -> AnalyzerResult<Arc<dyn ModelPipeline>> {
        match self.load_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.loads
            .lock()
            .unwrap()
            .push((task, model.map(str::to_owned)));

        if take_one(&self.failing_loads) {
            return Err(AnalyzerError::model_load(task, "weights not found"));
        }

        Ok(Arc::new(StubPipeline {
            task,
            summary: self.summary.clone(),
            swap_outputs: self.swap_outputs,
            failing_runs: Arc::clone(&self.failing_runs),
            requests: Arc::clone(&self.requests),
        }))
    }
}

struct StubPipeline {
    task: Task,
    summary: String,
    swap_outputs: bool,
    failing_runs: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Request>>>,
}

#[async_trait]
impl ModelPipeline for StubPipeline {
    async fn run(&self, input: &str, options: &PipelineOptions) -> AnalyzerResult<PipelineOutput> {
        self.requests.lock().unwrap().push(Request {
            task: self.task,
            input: input.to_string(),
            options: options.clone(),
        });

        if take_one(&self.failing_runs) {
            return Err(AnalyzerError::model_inference(self.task, "out of memory"));
        }

        let summaries = || {
            let records = if self.summary.is_empty() {
                Vec::new()
            } else {
                vec![SummaryRecord {
                    summary_text: self.summary.clone(),
                }]
            };
            PipelineOutput::Summaries(records)
        };
        let sentiment = || PipelineOutput::Sentiment(stub_sentiment());

        Ok(match (self.task, self.swap_outputs) {
            (Task::Summarization, false) | (Task::SentimentAnalysis, true) => summaries(),
            (Task::SentimentAnalysis, false) | (Task::Summarization, true) => sentiment(),
        })
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}
