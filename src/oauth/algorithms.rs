//! Supported-value registry consulted by metadata validation.
//!
//! The provider decides which auth methods, grant and response types, and
//! JOSE algorithms clients may register. [`AlgorithmRegistry`] is that
//! decision point; [`StaticAlgorithmRegistry`] is the configuration-backed
//! implementation the server uses.

use std::collections::HashSet;

use crate::oauth::types::{ClientAuthMethod, GrantType, ResponseType};

/// Decides whether a metadata field may carry the given value
pub trait AlgorithmRegistry: Send + Sync {
    fn is_supported(&self, field: &str, value: &str) -> bool;
}

/// Family of values a metadata field draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFamily {
    AuthMethod,
    GrantType,
    ResponseType,
    Signing,
    KeyManagement,
    ContentEncryption,
}

impl FieldFamily {
    /// Classify a metadata field name, `None` for fields outside the registry
    pub fn of(field: &str) -> Option<Self> {
        match field {
            "token_endpoint_auth_method" => Some(FieldFamily::AuthMethod),
            "grant_types" => Some(FieldFamily::GrantType),
            "response_types" => Some(FieldFamily::ResponseType),
            _ if field.ends_with("_signed_response_alg") || field.ends_with("_signing_alg") => {
                Some(FieldFamily::Signing)
            }
            _ if field.ends_with("_encrypted_response_alg") || field.ends_with("_encryption_alg") => {
                Some(FieldFamily::KeyManagement)
            }
            _ if field.ends_with("_encrypted_response_enc") || field.ends_with("_encryption_enc") => {
                Some(FieldFamily::ContentEncryption)
            }
            _ => None,
        }
    }
}

pub const DEFAULT_SIGNING_ALGS: &[&str] = &[
    "RS256", "PS256", "ES256", "EdDSA", "HS256", "HS384", "HS512",
];
pub const DEFAULT_ENCRYPTION_ALGS: &[&str] = &["RSA-OAEP", "ECDH-ES", "A128KW", "A256KW", "dir"];
pub const DEFAULT_ENCRYPTION_ENCS: &[&str] =
    &["A128CBC-HS256", "A256CBC-HS512", "A128GCM", "A256GCM"];
pub const DEFAULT_GRANT_TYPES: &[GrantType] = &[
    GrantType::AuthorizationCode,
    GrantType::Implicit,
    GrantType::RefreshToken,
];

/// Registry backed by fixed sets of allowed values
#[derive(Debug, Clone)]
pub struct StaticAlgorithmRegistry {
    auth_methods: HashSet<String>,
    grant_types: HashSet<String>,
    response_types: HashSet<String>,
    signing_algs: HashSet<String>,
    encryption_algs: HashSet<String>,
    encryption_encs: HashSet<String>,
}

fn to_set<I, S>(values: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl Default for StaticAlgorithmRegistry {
    fn default() -> Self {
        Self {
            auth_methods: to_set(ClientAuthMethod::ALL.iter().map(|m| m.as_str())),
            grant_types: to_set(DEFAULT_GRANT_TYPES.iter().map(|g| g.as_str())),
            response_types: to_set(ResponseType::ALL.iter().map(|r| r.as_str())),
            signing_algs: to_set(DEFAULT_SIGNING_ALGS.iter().copied()),
            encryption_algs: to_set(DEFAULT_ENCRYPTION_ALGS.iter().copied()),
            encryption_encs: to_set(DEFAULT_ENCRYPTION_ENCS.iter().copied()),
        }
    }
}

impl StaticAlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth_methods(mut self, methods: &[ClientAuthMethod]) -> Self {
        self.auth_methods = to_set(methods.iter().map(|m| m.as_str()));
        self
    }

    pub fn with_grant_types(mut self, grant_types: &[GrantType]) -> Self {
        self.grant_types = to_set(grant_types.iter().map(|g| g.as_str()));
        self
    }

    pub fn with_response_types(mut self, response_types: &[ResponseType]) -> Self {
        self.response_types = to_set(response_types.iter().map(|r| r.as_str()));
        self
    }

    pub fn with_signing_algs<S: AsRef<str>>(mut self, algs: &[S]) -> Self {
        self.signing_algs = to_set(algs.iter().map(|a| a.as_ref()));
        self
    }

    pub fn with_encryption_algs<S: AsRef<str>>(mut self, algs: &[S]) -> Self {
        self.encryption_algs = to_set(algs.iter().map(|a| a.as_ref()));
        self
    }

    pub fn with_encryption_encs<S: AsRef<str>>(mut self, encs: &[S]) -> Self {
        self.encryption_encs = to_set(encs.iter().map(|e| e.as_ref()));
        self
    }
}

impl AlgorithmRegistry for StaticAlgorithmRegistry {
    fn is_supported(&self, field: &str, value: &str) -> bool {
        let allowed = match FieldFamily::of(field) {
            Some(FieldFamily::AuthMethod) => &self.auth_methods,
            Some(FieldFamily::GrantType) => &self.grant_types,
            Some(FieldFamily::ResponseType) => &self.response_types,
            Some(FieldFamily::Signing) => &self.signing_algs,
            Some(FieldFamily::KeyManagement) => &self.encryption_algs,
            Some(FieldFamily::ContentEncryption) => &self.encryption_encs,
            None => return false,
        };
        allowed.contains(value)
    }
}
