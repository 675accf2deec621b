//! In-memory run repository
//!
//! Runs and their result rows live behind a single lock so result
//! replacement is atomic with respect to concurrent readers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::run::{InferenceResult, InferenceRun, RunId, RunRepository};

#[derive(Debug, Default)]
struct RunState {
    runs: HashMap<String, InferenceRun>,
    /// Result rows per run id, in creation order
    results: HashMap<String, Vec<InferenceResult>>,
}

#[derive(Debug, Default)]
pub struct InMemoryRunRepository {
    state: Arc<RwLock<RunState>>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn get(&self, id: &RunId) -> Result<Option<InferenceRun>, DomainError> {
        let state = self.state.read().await;
        Ok(state.runs.get(id.as_str()).cloned())
    }

    async fn create(&self, run: InferenceRun) -> Result<InferenceRun, DomainError> {
        let mut state = self.state.write().await;
        let id = run.id().as_str().to_string();

        if state.runs.contains_key(&id) {
            return Err(DomainError::conflict(format!("Run '{}' already exists", id)));
        }

        state.runs.insert(id, run.clone());
        Ok(run)
    }

    async fn update(&self, run: &InferenceRun) -> Result<InferenceRun, DomainError> {
        let mut state = self.state.write().await;
        let id = run.id().as_str().to_string();

        if !state.runs.contains_key(&id) {
            return Err(DomainError::not_found(format!("Run '{}'", id)));
        }

        state.runs.insert(id, run.clone());
        Ok(run.clone())
    }

    async fn delete(&self, id: &RunId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        state.results.remove(id.as_str());
        Ok(state.runs.remove(id.as_str()).is_some())
    }

    async fn replace_results(
        &self,
        run_id: &RunId,
        results: Vec<InferenceResult>,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.results.insert(run_id.as_str().to_string(), results);
        Ok(())
    }

    async fn list_results(
        &self,
        run_id: &RunId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InferenceResult>, DomainError> {
        let state = self.state.read().await;
        let rows = match state.results.get(run_id.as_str()) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn count_results(&self, run_id: &RunId) -> Result<usize, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .results
            .get(run_id.as_str())
            .map_or(0, |rows| rows.len()))
    }
}
