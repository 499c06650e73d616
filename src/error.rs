//! Error kinds surfaced by analysis calls; each is logged once and propagated.

use thiserror::Error;

use crate::model::Task;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("input is not a text value (got {found})")]
    InvalidInput { found: String },
    #[error("failed to load {task} pipeline: {message}")]
    ModelLoad { task: Task, message: String },
    #[error("{task} inference failed: {message}")]
    ModelInference { task: Task, message: String },
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl AnalyzerError {
    pub fn invalid_input(found: impl Into<String>) -> Self {
        Self::InvalidInput {
            found: found.into(),
        }
    }

    pub fn model_load(task: Task, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            task,
            message: message.into(),
        }
    }

    pub fn model_inference(task: Task, message: impl Into<String>) -> Self {
        Self::ModelInference {
            task,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(config::ConfigError::Message(message.into()))
    }
}
