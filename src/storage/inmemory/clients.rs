//! In-memory client adapter

use crate::errors::StorageError;
use crate::oauth::types::Client;
use crate::storage::traits::{ClientAdapter, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of client storage
#[derive(Default)]
pub struct MemoryClientAdapter {
    clients: Mutex<HashMap<String, Client>>,
}

impl MemoryClientAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clients.lock().map(|clients| clients.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClientAdapter for MemoryClientAdapter {
    async fn find(&self, client_id: &str) -> Result<Option<Client>> {
        let clients = self
            .clients
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;
        Ok(clients.get(client_id).cloned())
    }

    async fn upsert(&self, client_id: &str, client: &Client) -> Result<()> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;
        clients.insert(client_id.to_string(), client.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(client_id: &str) -> Client {
        serde_json::from_value(json!({
            "client_id": client_id,
            "client_id_issued_at": 1_700_000_000,
            "registration_access_token": "token",
            "application_type": "web",
            "grant_types": ["authorization_code"],
            "id_token_signed_response_alg": "RS256",
            "require_auth_time": false,
            "response_types": ["code"],
            "token_endpoint_auth_method": "none",
            "redirect_uris": ["https://client.example.com/cb"],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_and_upsert() {
        let adapter = MemoryClientAdapter::new();
        assert!(adapter.find("abc").await.unwrap().is_none());

        adapter.upsert("abc", &client("abc")).await.unwrap();
        assert_eq!(adapter.find("abc").await.unwrap(), Some(client("abc")));
        assert_eq!(adapter.len(), 1);

        let mut replacement = client("abc");
        replacement.registration_access_token = "rotated".to_string();
        adapter.upsert("abc", &replacement).await.unwrap();
        assert_eq!(adapter.len(), 1);
        assert_eq!(
            adapter.find("abc").await.unwrap().unwrap().registration_access_token,
            "rotated"
        );
    }
}
