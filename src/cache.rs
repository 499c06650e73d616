//! Construct-once pipeline handles, keyed by task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::AnalyzerResult;
use crate::model::{ModelBackend, ModelPipeline, Task};

type HandleCell = Arc<OnceCell<Arc<dyn ModelPipeline>>>;

/// Lazily loads one pipeline per task and keeps it for the cache's lifetime.
///
/// Concurrent first callers for the same task share a single load. A failed
/// load leaves the slot empty, so the next call tries again.
pub struct PipelineCache {
    backend: Arc<dyn ModelBackend>,
    cells: Mutex<HashMap<Task, HandleCell>>,
}

impl PipelineCache {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            cells: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, task: Task, model: Option<&str>) -> AnalyzerResult<Arc<dyn ModelPipeline>> {
        let cell = self.cell(task);
        if let Some(handle) = cell.get() {
            debug!(%task, "reusing cached pipeline");
            return Ok(Arc::clone(handle));
        }

        let handle = cell
            .get_or_try_init(|| async {
                info!(%task, model = model.unwrap_or("<default>"), "loading model pipeline");
                self.backend.load_pipeline(task, model).await
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    pub fn is_loaded(&self, task: Task) -> bool {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&task)
            .is_some_and(|cell| cell.initialized())
    }

    fn cell(&self, task: Task) -> HandleCell {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(task).or_default())
    }
}
