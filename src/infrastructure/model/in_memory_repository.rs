//! In-memory model repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::model::{Model, ModelId, ModelRepository};
use crate::domain::scorer::Modality;

#[derive(Debug, Default)]
pub struct InMemoryModelRepository {
    models: Arc<RwLock<HashMap<String, Model>>>,
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelRepository for InMemoryModelRepository {
    async fn get(&self, id: &ModelId) -> Result<Option<Model>, DomainError> {
        let models = self.models.read().await;
        Ok(models.get(id.as_str()).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Model>, DomainError> {
        let models = self.models.read().await;
        Ok(models.values().find(|m| m.name == name).cloned())
    }

    async fn create(&self, model: Model) -> Result<Model, DomainError> {
        let mut models = self.models.write().await;
        let id = model.id.as_str().to_string();

        if models.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Model '{}' already exists",
                id
            )));
        }
        if models.values().any(|m| m.name == model.name) {
            return Err(DomainError::conflict(format!(
                "Model named '{}' already exists",
                model.name
            )));
        }

        models.insert(id, model.clone());
        Ok(model)
    }

    async fn list(&self, modality: Option<Modality>) -> Result<Vec<Model>, DomainError> {
        let models = self.models.read().await;
        let mut matching: Vec<Model> = models
            .values()
            .filter(|m| modality.map_or(true, |wanted| m.modality == wanted))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }
}
