//! Analyzer configuration: model ids and summarization bounds.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `INSIGHT__*` environment variables
//! (e.g. `INSIGHT__SUMMARIZATION__MAX_LENGTH=60`).

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::model::PipelineOptions;

pub const ENV_PREFIX: &str = "INSIGHT";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "sshleifer/distilbart-cnn-6-6";
pub const DEFAULT_MAX_LENGTH: u32 = 100;
pub const DEFAULT_MIN_LENGTH: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub summarization: SummarizationSettings,
    pub sentiment: SentimentSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_length: u32,
    /// Lower bound on generated tokens.
    pub min_length: u32,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl SummarizationSettings {
    /// The options map handed to the summarization pipeline.
    pub fn options(&self) -> PipelineOptions {
        let mut options = PipelineOptions::new();
        options.insert("max_length".to_string(), json!(self.max_length));
        options.insert("min_length".to_string(), json!(self.min_length));
        options
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSettings {
    /// `None` lets the backend pick its default sentiment model.
    pub model: Option<String>,
}

impl AnalyzerConfig {
    /// Load from defaults, `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> AnalyzerResult<Self> {
        Self::load_from(path, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    pub fn load_from(path: Option<&Path>, env: Environment) -> AnalyzerResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let cfg: Self = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AnalyzerResult<()> {
        let s = &self.summarization;
        if s.model.trim().is_empty() {
            return Err(AnalyzerError::config("summarization.model must not be empty"));
        }
        if s.max_length == 0 {
            return Err(AnalyzerError::config(
                "summarization.max_length must be greater than zero",
            ));
        }
        if s.min_length > s.max_length {
            return Err(AnalyzerError::config(format!(
                "summarization.min_length ({}) exceeds max_length ({})",
                s.min_length, s.max_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let cfg = AnalyzerConfig::load_from(None, env_with(&[])).unwrap();
        assert_eq!(cfg, AnalyzerConfig::default());
        assert_eq!(cfg.summarization.max_length, 100);
        assert_eq!(cfg.summarization.min_length, 10);
        assert_eq!(cfg.sentiment.model, None);
    }

    #[test]
    fn test_default_options() {
        let options = SummarizationSettings::default().options();
        assert_eq!(options.get("max_length"), Some(&json!(100)));
        assert_eq!(options.get("min_length"), Some(&json!(10)));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("insight.toml");
        fs::write(
            &path,
            "[summarization]\nmax_length = 80\nmin_length = 20\n\n[sentiment]\nmodel = \"file-model\"\n",
        )
        .unwrap();

        let cfg = AnalyzerConfig::load_from(
            Some(&path),
            env_with(&[("INSIGHT__SUMMARIZATION__MAX_LENGTH", "60")]),
        )
        .unwrap();
        assert_eq!(cfg.summarization.max_length, 60);
        assert_eq!(cfg.summarization.min_length, 20);
        assert_eq!(cfg.summarization.model, DEFAULT_SUMMARIZATION_MODEL);
        assert_eq!(cfg.sentiment.model.as_deref(), Some("file-model"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = AnalyzerConfig::load_from(Some(&dir.path().join("absent.toml")), env_with(&[]))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = AnalyzerConfig::load_from(
            None,
            env_with(&[("INSIGHT__SUMMARIZATION__MIN_LENGTH", "500")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds max_length"));
    }

    #[test]
    fn test_rejects_zero_max_length() {
        let mut cfg = AnalyzerConfig::default();
        cfg.summarization.max_length = 0;
        cfg.summarization.min_length = 0;
        assert!(cfg.validate().is_err());
    }
}
