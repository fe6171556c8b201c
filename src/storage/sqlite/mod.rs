//! SQLite storage implementations
//!
//! Single-node persistence; the client record is stored as JSON text.

use crate::errors::StorageError;
use crate::oauth::types::Client;
use crate::storage::traits::{ClientAdapter, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;

/// SQLite implementation of client storage
pub struct SqliteClientAdapter {
    pool: SqlitePool,
}

impl SqliteClientAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ClientAdapter for SqliteClientAdapter {
    async fn find(&self, client_id: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT payload FROM registered_clients WHERE client_id = ?1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload").map_err(|e| {
                    StorageError::DatabaseError(format!("Failed to get payload: {}", e))
                })?;
                let client = serde_json::from_str(&payload)
                    .map_err(|e| StorageError::InvalidData(e.to_string()))?;
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, client_id: &str, client: &Client) -> Result<()> {
        let payload = serde_json::to_string(client)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO registered_clients (client_id, payload, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (client_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(client_id)
        .bind(&payload)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
