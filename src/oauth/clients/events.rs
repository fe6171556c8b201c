//! Registration lifecycle notifications.
//!
//! Observers are invoked synchronously, after the client has been persisted
//! and before the response is returned.

use std::sync::Arc;
use ulid::Ulid;

use crate::oauth::types::Client;

pub const REGISTRATION_SUCCESS: &str = "registration.success";

/// Request scoped data handed to observers
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub oidc: OidcContext,
}

#[derive(Debug, Clone)]
pub struct OidcContext {
    pub issuer: String,
    /// Route name, e.g. `registration`
    pub route: String,
    pub request_id: Ulid,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(issuer: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            oidc: OidcContext {
                issuer: issuer.into(),
                route: route.into(),
                request_id: Ulid::new(),
                user_agent: None,
            },
        }
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.oidc.user_agent = user_agent;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RegistrationEvent<'a> {
    /// A new client was stored
    Success {
        client: &'a Client,
        ctx: &'a RequestContext,
    },
}

impl RegistrationEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationEvent::Success { .. } => REGISTRATION_SUCCESS,
        }
    }
}

pub trait RegistrationObserver: Send + Sync {
    fn on_event(&self, event: &RegistrationEvent<'_>);
}

/// Ordered set of observers
#[derive(Clone, Default)]
pub struct RegistrationEvents {
    observers: Vec<Arc<dyn RegistrationObserver>>,
}

impl RegistrationEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Arc<dyn RegistrationObserver>) -> Self {
        self.subscribe(observer);
        self
    }

    pub fn subscribe(&mut self, observer: Arc<dyn RegistrationObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&self, event: RegistrationEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Logs every registration event at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RegistrationObserver for TracingObserver {
    fn on_event(&self, event: &RegistrationEvent<'_>) {
        match event {
            RegistrationEvent::Success { client, ctx } => {
                tracing::info!(
                    event = event.name(),
                    client_id = %client.client_id,
                    request_id = %ctx.oidc.request_id,
                    route = %ctx.oidc.route,
                    user_agent = ?ctx.oidc.user_agent,
                    "client registered"
                );
            }
        }
    }
}
