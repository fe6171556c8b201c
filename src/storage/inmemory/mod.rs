//! In-memory storage implementations
//!
//! Suitable for development, testing and single-process deployments.

mod clients;

pub use clients::MemoryClientAdapter;
