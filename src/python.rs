//! Python bindings — the analyzer driven by a `transformers.pipeline`-style factory.
//!
//! `factory(task, model=...)` must return a callable `handle(text, **options)`.
//! Summarization handles return `[{"summary_text": ...}]` (a single dict is
//! accepted too). Sentiment output is handed back exactly as produced, as long
//! as it is built from dicts, lists, tuples, strings, numbers, bools and None.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use pyo3::create_exception;
use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};
use serde_json::{Map, Number, Value};
use tokio::runtime::Runtime;
use tracing::error;

use crate::analyzer::Analyzer;
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::model::{
    ModelBackend, ModelPipeline, PipelineOptions, PipelineOutput, SummaryRecord, Task,
};
use crate::{normalize, stopwords, telemetry};

create_exception!(insight_core, InvalidInputError, PyValueError);
create_exception!(insight_core, ModelLoadError, PyRuntimeError);
create_exception!(insight_core, ModelInferenceError, PyRuntimeError);

impl From<AnalyzerError> for PyErr {
    fn from(err: AnalyzerError) -> Self {
        let message = err.to_string();
        match err {
            AnalyzerError::InvalidInput { .. } => InvalidInputError::new_err(message),
            AnalyzerError::ModelLoad { .. } => ModelLoadError::new_err(message),
            AnalyzerError::ModelInference { .. } => ModelInferenceError::new_err(message),
            AnalyzerError::Config(_) => PyValueError::new_err(message),
        }
    }
}

/// Accept only `str`; anything else is rejected before any model is touched.
fn extract_text(value: &Bound<'_, PyAny>) -> AnalyzerResult<String> {
    value.extract::<String>().map_err(|_| {
        let found = value
            .get_type()
            .name()
            .map(|name| name.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let err = AnalyzerError::invalid_input(found);
        error!(error = %err, "rejected input");
        err
    })
}

/// Lowercase, strip URLs/emails/symbols, drop stopwords and duplicate words.
#[pyfunction]
#[pyo3(name = "normalize_text")]
pub fn py_normalize_text(text: &Bound<'_, PyAny>) -> PyResult<String> {
    Ok(normalize::normalize(&extract_text(text)?))
}

/// Drop repeated whitespace-separated words, keeping first occurrences.
#[pyfunction]
#[pyo3(name = "dedupe_tokens")]
pub fn py_dedupe_tokens(text: &str) -> String {
    normalize::dedupe_tokens(text)
}

/// Check a lowercased word against the English stopword set.
#[pyfunction]
#[pyo3(name = "is_stopword")]
pub fn py_is_stopword(word: &str) -> bool {
    stopwords::is_stopword(word)
}

/// Route Rust-side logs to stderr. `INSIGHT_LOG` overrides `level`.
///
/// Returns False if logging was already initialised.
#[pyfunction]
#[pyo3(name = "init_logging", signature = (level=None))]
pub fn py_init_logging(level: Option<&str>) -> bool {
    telemetry::init_tracing(level)
}

struct PyModelBackend {
    factory: Arc<Py<PyAny>>,
}

#[async_trait]
impl ModelBackend for PyModelBackend {
    async fn load_pipeline(
        &self,
        task: Task,
        model: Option<&str>,
    ) -> AnalyzerResult<Arc<dyn ModelPipeline>> {
        let factory = Arc::clone(&self.factory);
        let model = model.map(str::to_owned);

        let handle = tokio::task::spawn_blocking(move || {
            Python::with_gil(|py| -> PyResult<Py<PyAny>> {
                let kwargs = PyDict::new_bound(py);
                if let Some(model) = &model {
                    kwargs.set_item("model", model)?;
                }
                Ok(factory
                    .bind(py)
                    .call((task.as_str(),), Some(&kwargs))?
                    .unbind())
            })
        })
        .await
        .map_err(|err| AnalyzerError::model_load(task, err.to_string()))?
        .map_err(|err| AnalyzerError::model_load(task, err.to_string()))?;

        Ok(Arc::new(PyModelPipeline {
            task,
            handle: Arc::new(handle),
        }))
    }
}

struct PyModelPipeline {
    task: Task,
    handle: Arc<Py<PyAny>>,
}

#[async_trait]
impl ModelPipeline for PyModelPipeline {
    async fn run(&self, input: &str, options: &PipelineOptions) -> AnalyzerResult<PipelineOutput> {
        let task = self.task;
        let handle = Arc::clone(&self.handle);
        let input = input.to_owned();
        let options = options.clone();

        tokio::task::spawn_blocking(move || {
            Python::with_gil(|py| -> PyResult<PipelineOutput> {
                let kwargs = PyDict::new_bound(py);
                for (key, value) in &options {
                    kwargs.set_item(key, json_to_py(py, value)?)?;
                }
                let raw = handle.bind(py).call((input,), Some(&kwargs))?;
                parse_output(task, &raw)
            })
        })
        .await
        .map_err(|err| AnalyzerError::model_inference(task, err.to_string()))?
        .map_err(|err| AnalyzerError::model_inference(task, err.to_string()))
    }
}

fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => b.into_py(py),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.into_py(py),
            (None, Some(u)) => u.into_py(py),
            (None, None) => n.as_f64().unwrap_or_default().into_py(py),
        },
        Value::String(s) => s.as_str().into_py(py),
        Value::Array(items) => {
            let list = PyList::empty_bound(py);
            for item in items {
                list.append(json_to_py(py, item)?)?;
            }
            list.into_py(py)
        }
        Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (key, item) in map {
                dict.set_item(key, json_to_py(py, item)?)?;
            }
            dict.into_py(py)
        }
    })
}

/// Convert plain Python data into JSON without rounding floats or dropping keys.
fn py_to_json(value: &Bound<'_, PyAny>) -> PyResult<Value> {
    if value.is_none() {
        return Ok(Value::Null);
    }
    // bool before int: Python bools are ints
    if let Ok(b) = value.downcast::<PyBool>() {
        return Ok(Value::Bool(b.is_true()));
    }
    if value.is_instance_of::<PyInt>() {
        return match value.extract::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => Ok(Value::from(value.extract::<u64>()?)),
        };
    }
    if let Ok(f) = value.downcast::<PyFloat>() {
        return float_to_json(f.value());
    }
    if value.is_instance_of::<PyString>() {
        return Ok(Value::String(value.extract()?));
    }
    if let Ok(dict) = value.downcast::<PyDict>() {
        let mut map = Map::new();
        for (key, item) in dict.iter() {
            let key = match key.extract::<String>() {
                Ok(key) => key,
                Err(_) => key.str()?.to_string(),
            };
            map.insert(key, py_to_json(&item)?);
        }
        return Ok(Value::Object(map));
    }
    if value.is_instance_of::<PyList>() || value.is_instance_of::<PyTuple>() {
        let items = value
            .iter()?
            .map(|item| py_to_json(&item?))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }
    // numpy scalars and other float-likes
    if let Ok(f) = value.extract::<f64>() {
        return float_to_json(f);
    }
    Err(PyTypeError::new_err(format!(
        "unsupported value in pipeline output: {}",
        value.get_type().name()?
    )))
}

fn float_to_json(f: f64) -> PyResult<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| PyValueError::new_err(format!("non-finite number in pipeline output: {f}")))
}

fn parse_output(task: Task, raw: &Bound<'_, PyAny>) -> PyResult<PipelineOutput> {
    match task {
        Task::Summarization => {
            let records: Vec<Bound<'_, PyAny>> = if raw.is_instance_of::<PyDict>() {
                vec![raw.clone()]
            } else {
                raw.iter()?.collect::<PyResult<_>>()?
            };
            records
                .iter()
                .map(|record| {
                    Ok(SummaryRecord {
                        summary_text: record.get_item("summary_text")?.extract()?,
                    })
                })
                .collect::<PyResult<Vec<_>>>()
                .map(PipelineOutput::Summaries)
        }
        Task::SentimentAnalysis => py_to_json(raw).map(PipelineOutput::Sentiment),
    }
}

/// Summarization and sentiment scoring over a Python pipeline factory.
///
/// Parameters
/// ----------
/// factory : Callable[..., Callable]
///     Called as ``factory(task, model=...)``; ``transformers.pipeline`` fits.
/// config_path : str | None
///     Optional TOML file; ``INSIGHT__*`` environment variables override it.
#[pyclass(name = "TextAnalyzer", module = "insight_core")]
pub struct PyTextAnalyzer {
    analyzer: Analyzer,
    runtime: Runtime,
}

#[pymethods]
impl PyTextAnalyzer {
    #[new]
    #[pyo3(signature = (factory, config_path=None))]
    fn new(factory: Py<PyAny>, config_path: Option<PathBuf>) -> PyResult<Self> {
        let config = AnalyzerConfig::load(config_path.as_deref())?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("insight-core")
            .enable_all()
            .build()
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))?;
        let backend = Arc::new(PyModelBackend {
            factory: Arc::new(factory),
        });
        Ok(Self {
            analyzer: Analyzer::new(backend, config),
            runtime,
        })
    }

    /// Normalize text without running any model.
    fn preprocess(&self, text: &Bound<'_, PyAny>) -> PyResult<String> {
        Ok(self.analyzer.preprocess(&extract_text(text)?))
    }

    /// Summarize text; repeated words are removed from the summary.
    fn summarize(&self, py: Python<'_>, text: &Bound<'_, PyAny>) -> PyResult<String> {
        let text = extract_text(text)?;
        let summary =
            py.allow_threads(|| self.runtime.block_on(self.analyzer.summarize(&text)))?;
        Ok(summary)
    }

    /// Score sentiment; returns the pipeline's output unchanged, usually
    /// ``list[dict]`` with ``label`` and ``score``.
    fn sentiment_score(&self, py: Python<'_>, text: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let text = extract_text(text)?;
        let scores =
            py.allow_threads(|| self.runtime.block_on(self.analyzer.sentiment_score(&text)))?;
        json_to_py(py, &scores)
    }
}

pub(crate) fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add("InvalidInputError", py.get_type_bound::<InvalidInputError>())?;
    m.add("ModelLoadError", py.get_type_bound::<ModelLoadError>())?;
    m.add("ModelInferenceError", py.get_type_bound::<ModelInferenceError>())?;
    m.add_class::<PyTextAnalyzer>()?;
    Ok(())
}
