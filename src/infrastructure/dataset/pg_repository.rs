//! PostgreSQL dataset repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::dataset::{Dataset, DatasetFile, DatasetId, DatasetRepository};
use crate::domain::error::DomainError;
use crate::domain::project::ProjectId;
use crate::infrastructure::db::{decode, encode, map_insert_err};

#[derive(Debug)]
pub struct PgDatasetRepository {
    pool: PgPool,
}

impl PgDatasetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS datasets (
                id VARCHAR(39) PRIMARY KEY,
                project_id VARCHAR(41) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create datasets table: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_datasets_project ON datasets (project_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to index datasets: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dataset_files (
                id VARCHAR(40) PRIMARY KEY,
                dataset_id VARCHAR(39) NOT NULL,
                seq BIGSERIAL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to create dataset_files table: {}", e))
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_dataset_files_dataset ON dataset_files (dataset_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to index dataset_files: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl DatasetRepository for PgDatasetRepository {
    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError> {
        let row = sqlx::query("SELECT data FROM datasets WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get dataset: {}", e)))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn create(&self, dataset: Dataset) -> Result<Dataset, DomainError> {
        sqlx::query(
            "INSERT INTO datasets (id, project_id, created_at, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(dataset.id.as_str())
        .bind(dataset.project_id.as_str())
        .bind(dataset.created_at)
        .bind(encode(&dataset)?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "Dataset", dataset.id.as_str()))?;

        Ok(dataset)
    }

    async fn list_by_project(&self, project_id: &ProjectId) -> Result<Vec<Dataset>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM datasets WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list datasets: {}", e)))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn add_file(&self, file: DatasetFile) -> Result<DatasetFile, DomainError> {
        sqlx::query("INSERT INTO dataset_files (id, dataset_id, data) VALUES ($1, $2, $3)")
            .bind(file.id.as_str())
            .bind(file.dataset_id.as_str())
            .bind(encode(&file)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_err(e, "Dataset file", file.id.as_str()))?;

        Ok(file)
    }

    async fn list_files(&self, dataset_id: &DatasetId) -> Result<Vec<DatasetFile>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM dataset_files WHERE dataset_id = $1 ORDER BY seq",
        )
        .bind(dataset_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list dataset files: {}", e)))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }
}
