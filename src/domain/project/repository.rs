//! Project repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Project, ProjectId};
use crate::domain::error::DomainError;

#[async_trait]
pub trait ProjectRepository: Send + Sync + Debug {
    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;

    async fn create(&self, project: Project) -> Result<Project, DomainError>;

    /// List all projects, newest first
    async fn list(&self) -> Result<Vec<Project>, DomainError>;

    async fn exists(&self, id: &ProjectId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
