//! Read-through cache in front of a [`ClientAdapter`].

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::oauth::types::Client;
use crate::storage::traits::{ClientAdapter, Result};

/// Client record store used by the registration service
pub struct ClientStore {
    adapter: Arc<dyn ClientAdapter>,
    cache: RwLock<HashMap<String, Client>>,
}

impl ClientStore {
    pub fn new(adapter: Arc<dyn ClientAdapter>) -> Self {
        Self {
            adapter,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Write through to the adapter. The cache only changes once the write
    /// succeeded.
    pub async fn upsert(&self, client: &Client) -> Result<()> {
        self.adapter.upsert(&client.client_id, client).await?;

        let mut cache = self.cache.write().await;
        cache.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    pub async fn find(&self, client_id: &str) -> Result<Option<Client>> {
        if let Some(client) = self.cache.read().await.get(client_id) {
            return Ok(Some(client.clone()));
        }

        // No lock is held while the adapter is awaited
        let found = self.adapter.find(client_id).await?;
        if let Some(client) = &found {
            let mut cache = self.cache.write().await;
            cache.insert(client_id.to_string(), client.clone());
        }
        Ok(found)
    }

    /// Drop every cached entry
    pub async fn purge(&self) {
        self.cache.write().await.clear();
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}
