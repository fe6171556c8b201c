//! OpenID Connect client registration domain.

pub mod algorithms;
pub mod clients;
pub mod types;

// Re-export frequently used items from each module
pub use algorithms::{AlgorithmRegistry, StaticAlgorithmRegistry};
pub use clients::{ClientRegistrationService, MetadataValidator, PresentedToken};
pub use types::{
    ApplicationType, Client, ClientAuthMethod, ClientMetadata, ClientRecord, GrantType,
    ResponseType, SubjectType,
};
