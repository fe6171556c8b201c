//! OpenID Connect Dynamic Client Registration library crate.
//!
//! Validates client metadata, issues credentials, and serves the
//! registration endpoints over a pluggable client store.

pub mod config;
pub mod errors;
pub mod http;
pub mod oauth;
pub mod storage;
