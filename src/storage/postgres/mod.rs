//! PostgreSQL storage implementations
//!
//! Suitable for multi-instance deployments sharing one database.

use crate::errors::StorageError;
use crate::oauth::types::Client;
use crate::storage::traits::{ClientAdapter, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgPool;

/// PostgreSQL implementation of client storage, payload kept as JSONB
pub struct PostgresClientAdapter {
    pool: PgPool,
}

impl PostgresClientAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ClientAdapter for PostgresClientAdapter {
    async fn find(&self, client_id: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT payload FROM registered_clients WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.try_get("payload").map_err(|e| {
                    StorageError::DatabaseError(format!("Failed to get payload: {}", e))
                })?;
                let client = serde_json::from_value(payload)
                    .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, client_id: &str, client: &Client) -> Result<()> {
        let payload = serde_json::to_value(client)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO registered_clients (client_id, payload)
            VALUES ($1, $2)
            ON CONFLICT (client_id) DO UPDATE SET
                payload = EXCLUDED.payload,
                updated_at = NOW()
            "#,
        )
        .bind(client_id)
        .bind(&payload)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
