//! PostgreSQL run repository
//!
//! Result replacement runs in a single transaction (delete-then-insert)
//! so readers never observe a mixed result set for a run.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::run::{InferenceResult, InferenceRun, RunId, RunRepository};
use crate::infrastructure::db::{decode, encode, map_insert_err};

#[derive(Debug)]
pub struct PgRunRepository {
    pool: PgPool,
}

impl PgRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inference_runs (
                id VARCHAR(40) PRIMARY KEY,
                created_at TIMESTAMPTZ NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to create inference_runs table: {}", e))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inference_results (
                id VARCHAR(40) PRIMARY KEY,
                run_id VARCHAR(40) NOT NULL,
                seq BIGINT NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to create inference_results table: {}", e))
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_inference_results_run ON inference_results (run_id, seq)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to index inference_results: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl RunRepository for PgRunRepository {
    async fn get(&self, id: &RunId) -> Result<Option<InferenceRun>, DomainError> {
        let row = sqlx::query("SELECT data FROM inference_runs WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get run: {}", e)))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn create(&self, run: InferenceRun) -> Result<InferenceRun, DomainError> {
        sqlx::query("INSERT INTO inference_runs (id, created_at, data) VALUES ($1, $2, $3)")
            .bind(run.id().as_str())
            .bind(run.created_at())
            .bind(encode(&run)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_err(e, "Run", run.id().as_str()))?;

        Ok(run)
    }

    async fn update(&self, run: &InferenceRun) -> Result<InferenceRun, DomainError> {
        let result = sqlx::query("UPDATE inference_runs SET data = $2 WHERE id = $1")
            .bind(run.id().as_str())
            .bind(encode(run)?)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update run: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("Run '{}'", run.id())));
        }

        Ok(run.clone())
    }

    async fn delete(&self, id: &RunId) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("DELETE FROM inference_results WHERE run_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete results: {}", e)))?;

        let result = sqlx::query("DELETE FROM inference_runs WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete run: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit delete: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_results(
        &self,
        run_id: &RunId,
        results: Vec<InferenceResult>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("DELETE FROM inference_results WHERE run_id = $1")
            .bind(run_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to clear results: {}", e)))?;

        for (seq, result) in results.iter().enumerate() {
            sqlx::query(
                "INSERT INTO inference_results (id, run_id, seq, data) VALUES ($1, $2, $3, $4)",
            )
            .bind(result.id.as_str())
            .bind(run_id.as_str())
            .bind(seq as i64)
            .bind(encode(result)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert result: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit results: {}", e)))?;

        Ok(())
    }

    async fn list_results(
        &self,
        run_id: &RunId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InferenceResult>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM inference_results WHERE run_id = $1 ORDER BY seq LIMIT $2 OFFSET $3",
        )
        .bind(run_id.as_str())
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list results: {}", e)))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn count_results(&self, run_id: &RunId) -> Result<usize, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM inference_results WHERE run_id = $1")
            .bind(run_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count results: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }
}
