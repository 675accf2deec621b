//! In-memory dataset repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::dataset::{Dataset, DatasetFile, DatasetId, DatasetRepository};
use crate::domain::error::DomainError;
use crate::domain::project::ProjectId;

#[derive(Debug, Default)]
pub struct InMemoryDatasetRepository {
    datasets: Arc<RwLock<HashMap<String, Dataset>>>,
    /// Files per dataset id, in upload order
    files: Arc<RwLock<HashMap<String, Vec<DatasetFile>>>>,
}

impl InMemoryDatasetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetRepository for InMemoryDatasetRepository {
    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError> {
        let datasets = self.datasets.read().await;
        Ok(datasets.get(id.as_str()).cloned())
    }

    async fn create(&self, dataset: Dataset) -> Result<Dataset, DomainError> {
        let mut datasets = self.datasets.write().await;
        let id = dataset.id.as_str().to_string();

        if datasets.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Dataset '{}' already exists",
                id
            )));
        }

        datasets.insert(id, dataset.clone());
        Ok(dataset)
    }

    async fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<Dataset>, DomainError> {
        let datasets = self.datasets.read().await;
        let mut matching: Vec<Dataset> = datasets
            .values()
            .filter(|d| &d.project_id == project_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn add_file(&self, file: DatasetFile) -> Result<DatasetFile, DomainError> {
        let mut files = self.files.write().await;
        files
            .entry(file.dataset_id.as_str().to_string())
            .or_default()
            .push(file.clone());
        Ok(file)
    }

    async fn list_files(&self, dataset_id: &DatasetId) -> Result<Vec<DatasetFile>, DomainError> {
        let files = self.files.read().await;
        Ok(files.get(dataset_id.as_str()).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::tests::{test_repository_crud, test_repository_files};

    #[tokio::test]
    async fn test_crud() {
        let repo = InMemoryDatasetRepository::new();
        test_repository_crud(&repo).await;
    }

    #[tokio::test]
    async fn test_files() {
        let repo = InMemoryDatasetRepository::new();
        test_repository_files(&repo).await;
    }
}
