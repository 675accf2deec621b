//! In-memory project repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::project::{Project, ProjectId, ProjectRepository};

#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<String, Project>>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        let projects = self.projects.read().await;
        Ok(projects.get(id.as_str()).cloned())
    }

    async fn create(&self, project: Project) -> Result<Project, DomainError> {
        let mut projects = self.projects.write().await;
        let id = project.id.as_str().to_string();

        if projects.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Project '{}' already exists",
                id
            )));
        }

        projects.insert(id, project.clone());
        Ok(project)
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let projects = self.projects.read().await;
        let mut all: Vec<Project> = projects.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
