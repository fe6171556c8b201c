//! OpenID Connect Dynamic Client Registration.
//!
//! Handles registration requests, credential generation, and reads of
//! registered clients guarded by their registration access token.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::errors::RegistrationError;
use crate::oauth::clients::credentials::{CredentialGenerator, MAX_CLIENT_ID_ATTEMPTS};
use crate::oauth::clients::events::{RegistrationEvent, RegistrationEvents, RequestContext};
use crate::oauth::clients::secret_policy::needs_secret;
use crate::oauth::clients::validation::MetadataValidator;
use crate::oauth::types::{Client, ClientRecord};
use crate::storage::cache::ClientStore;

/// Registration access token as presented by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentedToken {
    Bearer(String),
    /// Present but not a usable bearer credential
    Malformed,
}

/// Client Registration Service
pub struct ClientRegistrationService {
    store: Arc<ClientStore>,
    validator: MetadataValidator,
    generator: Arc<dyn CredentialGenerator>,
    events: RegistrationEvents,
    issuer: String,
}

impl ClientRegistrationService {
    /// Create a new client registration service
    pub fn new(
        store: Arc<ClientStore>,
        validator: MetadataValidator,
        generator: Arc<dyn CredentialGenerator>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            store,
            validator,
            generator,
            events: RegistrationEvents::new(),
            issuer: issuer.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_events(mut self, events: RegistrationEvents) -> Self {
        self.events = events;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn store(&self) -> &Arc<ClientStore> {
        &self.store
    }

    /// Register a new client from raw submitted metadata
    pub async fn register_client(
        &self,
        raw: &Value,
        ctx: &RequestContext,
    ) -> Result<Client, RegistrationError> {
        let metadata = self.validator.validate(raw)?;

        let client_secret = needs_secret(&metadata).then(|| self.generator.client_secret());
        let client_secret_expires_at = client_secret.as_ref().map(|_| 0);

        let client_id = self.unused_client_id().await?;

        let client = Client {
            client_id,
            client_id_issued_at: Utc::now().timestamp(),
            client_secret,
            client_secret_expires_at,
            registration_access_token: self.generator.registration_access_token(),
            metadata,
        };

        self.store.upsert(&client).await?;

        self.events.emit(RegistrationEvent::Success {
            client: &client,
            ctx,
        });

        Ok(client)
    }

    /// Draw client ids until one is not already registered
    async fn unused_client_id(&self) -> Result<String, RegistrationError> {
        for attempt in 1..=MAX_CLIENT_ID_ATTEMPTS {
            let candidate = self.generator.client_id();
            if self.store.find(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::warn!(attempt, "generated client_id already registered");
        }

        Err(RegistrationError::CredentialGenerationFailed(format!(
            "no unused client_id after {} attempts",
            MAX_CLIENT_ID_ATTEMPTS
        )))
    }

    /// Read a registered client, authorized by its registration access token
    pub async fn read_client(
        &self,
        client_id: &str,
        token: &PresentedToken,
    ) -> Result<Client, RegistrationError> {
        let client = self
            .store
            .find(client_id)
            .await?
            .ok_or_else(|| RegistrationError::InvalidClient("client is invalid".to_string()))?;

        let matches = match token {
            PresentedToken::Bearer(presented) => bool::from(
                presented
                    .as_bytes()
                    .ct_eq(client.registration_access_token.as_bytes()),
            ),
            PresentedToken::Malformed => false,
        };

        if !matches {
            tracing::warn!(client_id, "registration access token verification failed");
            return Err(RegistrationError::InvalidToken);
        }

        Ok(client)
    }

    /// Wire record for a client, including its `registration_client_uri`
    pub fn record<'a>(&self, client: &'a Client) -> ClientRecord<'a> {
        ClientRecord::new(client, &self.issuer)
    }
}
