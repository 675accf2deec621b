//! Dataset repository trait
//!
//! The dataset aggregate owns its uploaded files, so one repository covers
//! both datasets and their file records.

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Dataset, DatasetFile, DatasetId};
use crate::domain::error::DomainError;
use crate::domain::project::ProjectId;

#[async_trait]
pub trait DatasetRepository: Send + Sync + Debug {
    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError>;

    async fn create(&self, dataset: Dataset) -> Result<Dataset, DomainError>;

    /// List a project's datasets, newest first
    async fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<Dataset>, DomainError>;

    /// Record an uploaded file
    async fn add_file(&self, file: DatasetFile) -> Result<DatasetFile, DomainError>;

    /// List a dataset's files in upload order
    async fn list_files(&self, dataset_id: &DatasetId) -> Result<Vec<DatasetFile>, DomainError>;

    async fn exists(&self, id: &DatasetId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::domain::scorer::Modality;

    /// Shared test suite for DatasetRepository implementations
    pub async fn test_repository_crud<R: DatasetRepository>(repo: &R) {
        let project_id = ProjectId::generate();
        let dataset = Dataset::new(project_id.clone(), "images", Modality::Vision);
        let id = dataset.id.clone();

        repo.create(dataset).await.expect("create should succeed");

        let fetched = repo.get(&id).await.unwrap().expect("dataset should exist");
        assert_eq!(fetched.name, "images");

        let listed = repo.list_by_project(&project_id).await.unwrap();
        assert_eq!(listed.len(), 1);

        let other = repo.list_by_project(&ProjectId::generate()).await.unwrap();
        assert!(other.is_empty());
    }

    /// Files are listed in upload order, scoped to their dataset
    pub async fn test_repository_files<R: DatasetRepository>(repo: &R) {
        let dataset = Dataset::new(ProjectId::generate(), "series", Modality::Timeseries);
        let dataset_id = dataset.id.clone();
        repo.create(dataset).await.unwrap();

        for name in ["a.csv", "b.csv"] {
            let file = DatasetFile::new(
                dataset_id.clone(),
                name,
                format!("raw/{}", name),
                Some("text/csv".to_string()),
                8,
                None,
            );
            repo.add_file(file).await.expect("add_file should succeed");
        }

        let files = repo.list_files(&dataset_id).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "a.csv");
        assert_eq!(files[1].file_name, "b.csv");

        let none = repo.list_files(&DatasetId::generate()).await.unwrap();
        assert!(none.is_empty());
    }
}
