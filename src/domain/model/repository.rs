//! Model repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Model, ModelId};
use crate::domain::error::DomainError;
use crate::domain::scorer::Modality;

#[async_trait]
pub trait ModelRepository: Send + Sync + Debug {
    async fn get(&self, id: &ModelId) -> Result<Option<Model>, DomainError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Model>, DomainError>;

    async fn create(&self, model: Model) -> Result<Model, DomainError>;

    /// List models oldest first, optionally filtered by modality
    async fn list(&self, modality: Option<Modality>) -> Result<Vec<Model>, DomainError>;

    async fn exists(&self, id: &ModelId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
