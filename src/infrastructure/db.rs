//! PostgreSQL connection helpers
//!
//! Entities are persisted as JSONB documents alongside the key columns
//! each repository filters and orders by.

use serde::de::DeserializeOwned;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::error::DomainError;

/// Pool sizing defaults for the service
const MAX_CONNECTIONS: u32 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Connect a pooled PostgreSQL client
pub async fn connect(url: &str) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .connect(url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

/// Decode a JSONB document column into an entity
pub(crate) fn decode<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, DomainError> {
    serde_json::from_value(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
}

/// Encode an entity into its JSONB document
pub(crate) fn encode<T: serde::Serialize>(entity: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))
}

/// Map a sqlx error, folding unique violations into conflicts
pub(crate) fn map_insert_err(e: sqlx::Error, what: &str, key: &str) -> DomainError {
    if e.to_string().contains("duplicate key") {
        DomainError::conflict(format!("{} '{}' already exists", what, key))
    } else {
        DomainError::storage(format!("Failed to create {}: {}", what.to_lowercase(), e))
    }
}
