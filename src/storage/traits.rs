//! Storage trait definitions for registered clients.
//!
//! Adapters only persist and look up records. Caching lives in
//! [`crate::storage::cache::ClientStore`].

use crate::errors::StorageError;
use crate::oauth::types::Client;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence backend for registered clients
#[async_trait]
pub trait ClientAdapter: Send + Sync {
    /// Retrieve a client by ID
    async fn find(&self, client_id: &str) -> Result<Option<Client>>;

    /// Insert or replace the client stored under `client_id`
    async fn upsert(&self, client_id: &str, client: &Client) -> Result<()>;
}
