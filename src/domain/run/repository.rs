//! Run repository trait
//!
//! Sole mutator of run status and result rows. Result replacement and
//! status updates are always scoped to a single run, so concurrent runs
//! never interfere with each other's rows.

use std::fmt::Debug;

use async_trait::async_trait;

use super::{InferenceResult, InferenceRun, RunId};
use crate::domain::error::DomainError;

#[async_trait]
pub trait RunRepository: Send + Sync + Debug {
    async fn get(&self, id: &RunId) -> Result<Option<InferenceRun>, DomainError>;

    async fn create(&self, run: InferenceRun) -> Result<InferenceRun, DomainError>;

    /// Persist a status transition (and summary/error) already applied to the entity
    async fn update(&self, run: &InferenceRun) -> Result<InferenceRun, DomainError>;

    /// Delete a run and all of its result rows
    async fn delete(&self, id: &RunId) -> Result<bool, DomainError>;

    /// Atomically replace all result rows of `run_id` with `results`,
    /// preserving the given order as creation order
    async fn replace_results(
        &self,
        run_id: &RunId,
        results: Vec<InferenceResult>,
    ) -> Result<(), DomainError>;

    /// A stable page of results in creation order
    async fn list_results(
        &self,
        run_id: &RunId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InferenceResult>, DomainError>;

    async fn count_results(&self, run_id: &RunId) -> Result<usize, DomainError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde_json::json;

    use crate::domain::dataset::DatasetId;
    use crate::domain::model::ModelId;
    use crate::domain::project::ProjectId;
    use crate::domain::run::{RunStatus, RunSummary};
    use crate::domain::scorer::{SampleResult, Verdict};

    pub fn create_test_run() -> InferenceRun {
        InferenceRun::new(
            ProjectId::generate(),
            DatasetId::generate(),
            ModelId::generate(),
            json!({"threshold": 0.5}),
        )
    }

    pub fn create_test_results(run_id: &RunId, count: usize) -> Vec<InferenceResult> {
        (0..count)
            .map(|i| {
                let sample = SampleResult {
                    sample_key: format!("sensor.csv:row:{}", i),
                    score: Some(0.9),
                    verdict: Some(Verdict::Ok),
                    output_path: None,
                    detail: json!({"row_index": i}),
                    summary: json!({"rule": "test", "threshold": 0.5}),
                };
                InferenceResult::from_sample(run_id, &sample)
            })
            .collect()
    }

    /// Shared test suite: create, get, update, delete
    pub async fn test_repository_basic_crud<R: RunRepository>(repo: &R) {
        let run = create_test_run();
        let run_id = run.id().clone();

        let created = repo.create(run).await.expect("create should succeed");
        assert_eq!(created.status(), RunStatus::Queued);

        let mut fetched = repo
            .get(&run_id)
            .await
            .expect("get should succeed")
            .expect("run should exist");
        assert_eq!(fetched.id(), &run_id);

        fetched.mark_running().unwrap();
        repo.update(&fetched).await.expect("update should succeed");

        let after = repo.get(&run_id).await.unwrap().unwrap();
        assert_eq!(after.status(), RunStatus::Running);
        assert!(after.started_at().is_some());

        assert!(repo.delete(&run_id).await.unwrap());
        assert!(repo.get(&run_id).await.unwrap().is_none());
        assert!(!repo.delete(&run_id).await.unwrap());
    }

    /// Duplicate creation conflicts; updating a missing run fails
    pub async fn test_repository_create_update_guards<R: RunRepository>(repo: &R) {
        let run = create_test_run();
        repo.create(run.clone()).await.unwrap();
        assert!(repo.create(run).await.is_err());

        let missing = create_test_run();
        assert!(repo.update(&missing).await.is_err());
    }

    /// Results are replaced wholesale and keep scorer output order
    pub async fn test_repository_replace_results<R: RunRepository>(repo: &R) {
        let run = create_test_run();
        let run_id = run.id().clone();
        repo.create(run).await.unwrap();

        let first = create_test_results(&run_id, 3);
        repo.replace_results(&run_id, first).await.unwrap();
        assert_eq!(repo.count_results(&run_id).await.unwrap(), 3);

        // A second execution attempt replaces, never accumulates
        let second = create_test_results(&run_id, 2);
        let second_keys: Vec<String> =
            second.iter().map(|r| r.sample_key.clone()).collect();
        repo.replace_results(&run_id, second).await.unwrap();

        assert_eq!(repo.count_results(&run_id).await.unwrap(), 2);
        let rows = repo.list_results(&run_id, 500, 0).await.unwrap();
        let keys: Vec<String> = rows.iter().map(|r| r.sample_key.clone()).collect();
        assert_eq!(keys, second_keys);
    }

    /// Pagination yields the full set with no duplicates and no gaps
    pub async fn test_repository_result_pagination<R: RunRepository>(repo: &R) {
        let run = create_test_run();
        let run_id = run.id().clone();
        repo.create(run).await.unwrap();

        let results = create_test_results(&run_id, 7);
        let expected: Vec<String> = results.iter().map(|r| r.sample_key.clone()).collect();
        repo.replace_results(&run_id, results).await.unwrap();

        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let page = repo.list_results(&run_id, 3, offset).await.unwrap();
            assert!(page.len() <= 3);
            if page.is_empty() {
                break;
            }
            seen.extend(page.iter().map(|r| r.sample_key.clone()));
            offset += page.len();
        }

        assert_eq!(seen, expected);
    }

    /// Result sets of concurrent runs are isolated
    pub async fn test_repository_run_isolation<R: RunRepository>(repo: &R) {
        let run_a = create_test_run();
        let run_b = create_test_run();
        let id_a = run_a.id().clone();
        let id_b = run_b.id().clone();
        repo.create(run_a).await.unwrap();
        repo.create(run_b).await.unwrap();

        repo.replace_results(&id_a, create_test_results(&id_a, 4))
            .await
            .unwrap();
        repo.replace_results(&id_b, create_test_results(&id_b, 1))
            .await
            .unwrap();

        assert_eq!(repo.count_results(&id_a).await.unwrap(), 4);
        assert_eq!(repo.count_results(&id_b).await.unwrap(), 1);

        // Deleting one run cascades only its own rows
        repo.delete(&id_a).await.unwrap();
        assert_eq!(repo.count_results(&id_a).await.unwrap(), 0);
        assert_eq!(repo.count_results(&id_b).await.unwrap(), 1);
    }

    /// Summary and error survive persistence round-trips
    pub async fn test_repository_terminal_fields<R: RunRepository>(repo: &R) {
        let mut done = create_test_run();
        let done_id = done.id().clone();
        repo.create(done.clone()).await.unwrap();
        done.mark_running().unwrap();
        done.mark_done(RunSummary {
            total: 2,
            ok: 2,
            ng: 0,
            output_dir: "out".to_string(),
        })
        .unwrap();
        repo.update(&done).await.unwrap();

        let fetched = repo.get(&done_id).await.unwrap().unwrap();
        assert_eq!(fetched.status(), RunStatus::Done);
        assert_eq!(fetched.summary().unwrap().ok, 2);
        assert!(fetched.error_message().is_none());

        let mut failed = create_test_run();
        let failed_id = failed.id().clone();
        repo.create(failed.clone()).await.unwrap();
        failed.mark_running().unwrap();
        failed.mark_failed("scorer exploded").unwrap();
        repo.update(&failed).await.unwrap();

        let fetched = repo.get(&failed_id).await.unwrap().unwrap();
        assert_eq!(fetched.status(), RunStatus::Failed);
        assert_eq!(fetched.error_message(), Some("scorer exploded"));
        assert!(fetched.summary().is_none());
    }
}
