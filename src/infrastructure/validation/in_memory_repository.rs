//! In-memory validation repository

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::run::RunId;
use crate::domain::validation::{Validation, ValidationRepository};

#[derive(Debug, Default)]
pub struct InMemoryValidationRepository {
    validations: Arc<RwLock<Vec<Validation>>>,
}

impl InMemoryValidationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ValidationRepository for InMemoryValidationRepository {
    async fn create(&self, validation: Validation) -> Result<Validation, DomainError> {
        let mut validations = self.validations.write().await;
        validations.push(validation.clone());
        Ok(validation)
    }

    async fn list_by_run(&self, run_id: &RunId) -> Result<Vec<Validation>, DomainError> {
        let validations = self.validations.read().await;
        let mut matching: Vec<Validation> = validations
            .iter()
            .filter(|v| &v.run_id == run_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::tests::test_repository_append_and_list;

    #[tokio::test]
    async fn test_append_and_list() {
        let repo = InMemoryValidationRepository::new();
        test_repository_append_and_list(&repo).await;
    }
}
