//! Client registration.
//!
//! Validation, secret policy, credential generation and lifecycle events for
//! OpenID Connect Dynamic Client Registration.

pub mod credentials;
pub mod events;
pub mod registration;
pub mod secret_policy;
pub mod validation;

// Re-export main types and services
pub use credentials::{CredentialGenerator, FixedSequenceGenerator, RandomCredentialGenerator};
pub use events::{
    RegistrationEvent, RegistrationEvents, RegistrationObserver, RequestContext, TracingObserver,
};
pub use registration::{ClientRegistrationService, PresentedToken};
pub use validation::MetadataValidator;
