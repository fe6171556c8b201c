//! Application state shared by the HTTP handlers.

use axum::extract::FromRef;
use std::sync::Arc;

use crate::oauth::clients::registration::ClientRegistrationService;

#[derive(Clone)]
pub struct AppState {
    /// Client registration service for dynamic client registration
    pub registration_service: Arc<ClientRegistrationService>,
}

impl AppState {
    pub fn new(registration_service: Arc<ClientRegistrationService>) -> Self {
        Self {
            registration_service,
        }
    }
}

impl FromRef<AppState> for Arc<ClientRegistrationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registration_service.clone()
    }
}
