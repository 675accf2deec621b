//! PostgreSQL project repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::error::DomainError;
use crate::domain::project::{Project, ProjectId, ProjectRepository};
use crate::infrastructure::db::{decode, encode, map_insert_err};

#[derive(Debug)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id VARCHAR(41) PRIMARY KEY,
                created_at TIMESTAMPTZ NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create projects table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        let row = sqlx::query("SELECT data FROM projects WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get project: {}", e)))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn create(&self, project: Project) -> Result<Project, DomainError> {
        sqlx::query("INSERT INTO projects (id, created_at, data) VALUES ($1, $2, $3)")
            .bind(project.id.as_str())
            .bind(project.created_at)
            .bind(encode(&project)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_err(e, "Project", project.id.as_str()))?;

        Ok(project)
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let rows = sqlx::query("SELECT data FROM projects ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list projects: {}", e)))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }
}
