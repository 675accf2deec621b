//! PostgreSQL model repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::model::{Model, ModelId, ModelRepository};
use crate::domain::scorer::Modality;
use crate::infrastructure::db::{decode, encode, map_insert_err};

#[derive(Debug)]
pub struct PgModelRepository {
    pool: PgPool,
}

impl PgModelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS models (
                id VARCHAR(40) PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                modality VARCHAR(20) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create models table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ModelRepository for PgModelRepository {
    async fn get(&self, id: &ModelId) -> Result<Option<Model>, DomainError> {
        let row = sqlx::query("SELECT data FROM models WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get model: {}", e)))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Model>, DomainError> {
        let row = sqlx::query("SELECT data FROM models WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get model by name: {}", e)))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn create(&self, model: Model) -> Result<Model, DomainError> {
        sqlx::query(
            "INSERT INTO models (id, name, modality, created_at, data) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(model.id.as_str())
        .bind(&model.name)
        .bind(model.modality.to_string())
        .bind(model.created_at)
        .bind(encode(&model)?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "Model", model.id.as_str()))?;

        Ok(model)
    }

    async fn list(&self, modality: Option<Modality>) -> Result<Vec<Model>, DomainError> {
        let rows = match modality {
            Some(modality) => {
                sqlx::query("SELECT data FROM models WHERE modality = $1 ORDER BY created_at ASC")
                    .bind(modality.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT data FROM models ORDER BY created_at ASC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to list models: {}", e)))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }
}
