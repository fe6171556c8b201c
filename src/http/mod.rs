//! Axum HTTP server handlers and middleware for the registration endpoints.

pub mod context;
mod handler_registration;
pub mod middleware_auth;
pub mod server;

pub use context::AppState;
pub use server::build_router;
