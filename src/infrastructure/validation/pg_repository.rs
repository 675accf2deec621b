//! PostgreSQL validation repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::run::RunId;
use crate::domain::validation::{Validation, ValidationRepository};
use crate::infrastructure::db::{decode, encode, map_insert_err};

#[derive(Debug)]
pub struct PgValidationRepository {
    pool: PgPool,
}

impl PgValidationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS validations (
                id VARCHAR(40) PRIMARY KEY,
                run_id VARCHAR(40) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create validations table: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_validations_run ON validations (run_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to index validations: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ValidationRepository for PgValidationRepository {
    async fn create(&self, validation: Validation) -> Result<Validation, DomainError> {
        sqlx::query(
            "INSERT INTO validations (id, run_id, created_at, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(validation.id.as_str())
        .bind(validation.run_id.as_str())
        .bind(validation.created_at)
        .bind(encode(&validation)?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "Validation", validation.id.as_str()))?;

        Ok(validation)
    }

    async fn list_by_run(&self, run_id: &RunId) -> Result<Vec<Validation>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM validations WHERE run_id = $1 ORDER BY created_at DESC",
        )
        .bind(run_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list validations: {}", e)))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }
}
