//! Validation repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::Validation;
use crate::domain::error::DomainError;
use crate::domain::run::RunId;

#[async_trait]
pub trait ValidationRepository: Send + Sync + Debug {
    /// Append a validation; existing rows are never mutated
    async fn create(&self, validation: Validation) -> Result<Validation, DomainError>;

    /// List a run's validations, newest first
    async fn list_by_run(&self, run_id: &RunId) -> Result<Vec<Validation>, DomainError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Shared test suite for ValidationRepository implementations
    pub async fn test_repository_append_and_list<R: ValidationRepository>(repo: &R) {
        let run_id = RunId::generate();

        let mut older = Validation::new(run_id.clone(), "a.png", "ok", None);
        older.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
        repo.create(older).await.expect("create should succeed");
        repo.create(Validation::new(run_id.clone(), "b.png", "ng", None))
            .await
            .unwrap();

        let listed = repo.list_by_run(&run_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].sample_key, "b.png");
        assert_eq!(listed[1].sample_key, "a.png");

        let other = repo.list_by_run(&RunId::generate()).await.unwrap();
        assert!(other.is_empty());
    }
}
