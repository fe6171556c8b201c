//! Router configuration for the registration endpoints.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    context::AppState,
    handler_registration::{handle_read_client, handle_register_client},
    middleware_auth::set_no_cache_headers,
};
use crate::oauth::types::REGISTRATION_PATH;

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    let registration_routes = Router::new()
        .route("/", post(handle_register_client))
        .route("/{client_id}", get(handle_read_client))
        .layer(middleware::map_response(set_no_cache_headers));

    Router::new()
        .nest(REGISTRATION_PATH, registration_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
