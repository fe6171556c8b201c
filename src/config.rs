//! Environment-based configuration types for the registration server.

use anyhow::Result;
use url::Url;

use crate::errors::ConfigError;
use crate::oauth::algorithms::{
    DEFAULT_ENCRYPTION_ALGS, DEFAULT_ENCRYPTION_ENCS, DEFAULT_GRANT_TYPES, DEFAULT_SIGNING_ALGS,
    StaticAlgorithmRegistry,
};
use crate::oauth::types::{ClientAuthMethod, GrantType};

/// HTTP server port configuration
#[derive(Clone, Debug)]
pub struct HttpPort(u16);

/// Issuer base URL, stored without a trailing slash
#[derive(Clone, Debug)]
pub struct IssuerUrl(String);

/// Whether unrecognized metadata names fail registration
#[derive(Clone, Debug)]
pub struct RejectUnknownMetadata(bool);

/// Token endpoint authentication methods clients may register
#[derive(Clone, Debug)]
pub struct SupportedAuthMethods(Vec<ClientAuthMethod>);

/// Grant types clients may register
#[derive(Clone, Debug)]
pub struct SupportedGrantTypes(Vec<GrantType>);

/// JOSE algorithm names accepted for one algorithm family
#[derive(Clone, Debug)]
pub struct AlgorithmList(Vec<String>);

/// Main application configuration
#[derive(Clone)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub external_base: IssuerUrl,
    pub storage_backend: String,
    pub database_url: Option<String>,
    pub reject_unknown_metadata: RejectUnknownMetadata,
    pub supported_auth_methods: SupportedAuthMethods,
    pub supported_grant_types: SupportedGrantTypes,
    pub supported_signing_algs: AlgorithmList,
    pub supported_encryption_algs: AlgorithmList,
    pub supported_encryption_encs: AlgorithmList,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let external_base: IssuerUrl = require_env("EXTERNAL_BASE")?.try_into()?;
        let http_port: HttpPort = default_env("HTTP_PORT", "8080").try_into()?;
        let storage_backend = default_env("STORAGE_BACKEND", "memory");
        let database_url = optional_env("DATABASE_URL");
        let reject_unknown_metadata: RejectUnknownMetadata =
            default_env("REGISTRATION_REJECT_UNKNOWN_METADATA", "false").try_into()?;
        let supported_auth_methods: SupportedAuthMethods =
            optional_env("SUPPORTED_TOKEN_ENDPOINT_AUTH_METHODS").try_into()?;
        let supported_grant_types: SupportedGrantTypes =
            optional_env("SUPPORTED_GRANT_TYPES").try_into()?;
        let supported_signing_algs: AlgorithmList = default_env(
            "SUPPORTED_SIGNING_ALGS",
            &DEFAULT_SIGNING_ALGS.join(","),
        )
        .try_into()?;
        let supported_encryption_algs: AlgorithmList = default_env(
            "SUPPORTED_ENCRYPTION_ALGS",
            &DEFAULT_ENCRYPTION_ALGS.join(","),
        )
        .try_into()?;
        let supported_encryption_encs: AlgorithmList = default_env(
            "SUPPORTED_ENCRYPTION_ENCS",
            &DEFAULT_ENCRYPTION_ENCS.join(","),
        )
        .try_into()?;

        Ok(Self {
            version: version()?,
            http_port,
            external_base,
            storage_backend,
            database_url,
            reject_unknown_metadata,
            supported_auth_methods,
            supported_grant_types,
            supported_signing_algs,
            supported_encryption_algs,
            supported_encryption_encs,
        })
    }

    /// Registry of values clients may register, built from the supported lists
    pub fn algorithm_registry(&self) -> StaticAlgorithmRegistry {
        StaticAlgorithmRegistry::new()
            .with_auth_methods(self.supported_auth_methods.as_ref())
            .with_grant_types(self.supported_grant_types.as_ref())
            .with_signing_algs(self.supported_signing_algs.as_ref())
            .with_encryption_algs(self.supported_encryption_algs.as_ref())
            .with_encryption_encs(self.supported_encryption_encs.as_ref())
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ConfigError::EnvVarRequired(name.to_string()).into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

/// Split a comma separated list, dropping blank entries
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<String> for IssuerUrl {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parsed = Url::parse(&value)
            .map_err(|err| ConfigError::InvalidIssuer(value.clone(), err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidIssuer(
                value,
                "scheme must be http or https".to_string(),
            )
            .into());
        }
        Ok(Self(value.trim_end_matches('/').to_string()))
    }
}

impl AsRef<str> for IssuerUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RejectUnknownMetadata {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self(true)),
            "false" | "0" | "no" | "off" => Ok(Self(false)),
            _ => Err(ConfigError::BoolParsingFailed(value).into()),
        }
    }
}

impl AsRef<bool> for RejectUnknownMetadata {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}

impl TryFrom<Option<String>> for SupportedAuthMethods {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value {
            None => Ok(Self(ClientAuthMethod::ALL.to_vec())),
            Some(value) => value.try_into(),
        }
    }
}

impl TryFrom<String> for SupportedAuthMethods {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let methods = split_list(&value)
            .map(|item| {
                item.parse::<ClientAuthMethod>().map_err(|_| {
                    ConfigError::UnsupportedListValue(
                        "SUPPORTED_TOKEN_ENDPOINT_AUTH_METHODS".to_string(),
                        item.to_string(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if methods.is_empty() {
            return Ok(Self(ClientAuthMethod::ALL.to_vec()));
        }
        Ok(Self(methods))
    }
}

impl AsRef<[ClientAuthMethod]> for SupportedAuthMethods {
    fn as_ref(&self) -> &[ClientAuthMethod] {
        &self.0
    }
}

impl TryFrom<Option<String>> for SupportedGrantTypes {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value {
            None => Ok(Self(DEFAULT_GRANT_TYPES.to_vec())),
            Some(value) => value.try_into(),
        }
    }
}

impl TryFrom<String> for SupportedGrantTypes {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let grant_types = split_list(&value)
            .map(|item| {
                item.parse::<GrantType>().map_err(|_| {
                    ConfigError::UnsupportedListValue(
                        "SUPPORTED_GRANT_TYPES".to_string(),
                        item.to_string(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if grant_types.is_empty() {
            return Ok(Self(DEFAULT_GRANT_TYPES.to_vec()));
        }
        Ok(Self(grant_types))
    }
}

impl AsRef<[GrantType]> for SupportedGrantTypes {
    fn as_ref(&self) -> &[GrantType] {
        &self.0
    }
}

impl TryFrom<String> for AlgorithmList {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut algorithms = Vec::new();
        for item in split_list(&value) {
            // Unsecured JWS is never a supported registration value
            if item == "none" {
                return Err(ConfigError::UnsupportedListValue(
                    "algorithm list".to_string(),
                    item.to_string(),
                )
                .into());
            }
            algorithms.push(item.to_string());
        }
        Ok(Self(algorithms))
    }
}

impl AsRef<[String]> for AlgorithmList {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::algorithms::AlgorithmRegistry;

    #[test]
    fn test_http_port() {
        let port: HttpPort = "3000".to_string().try_into().unwrap();
        assert_eq!(*port.as_ref(), 3000);

        let port: HttpPort = "".to_string().try_into().unwrap();
        assert_eq!(*port.as_ref(), 8080);

        let port: Result<HttpPort> = "port".to_string().try_into();
        assert!(port.is_err());
    }

    #[test]
    fn test_issuer_url_trims_trailing_slash() {
        let issuer: IssuerUrl = "https://op.example.com/".to_string().try_into().unwrap();
        assert_eq!(issuer.as_ref(), "https://op.example.com");

        let issuer: Result<IssuerUrl> = "op.example.com".to_string().try_into();
        assert!(issuer.is_err());

        let issuer: Result<IssuerUrl> = "ftp://op.example.com".to_string().try_into();
        assert!(issuer.is_err());
    }

    #[test]
    fn test_reject_unknown_metadata_parsing() {
        for value in ["true", "1", "YES", "on"] {
            let parsed: RejectUnknownMetadata = value.to_string().try_into().unwrap();
            assert!(*parsed.as_ref(), "{value}");
        }
        for value in ["false", "0", "no", "Off"] {
            let parsed: RejectUnknownMetadata = value.to_string().try_into().unwrap();
            assert!(!*parsed.as_ref(), "{value}");
        }

        let parsed: Result<RejectUnknownMetadata> = "maybe".to_string().try_into();
        let error = parsed.err().unwrap().to_string();
        assert!(error.starts_with("error-reg-config-5"));
    }

    #[test]
    fn test_supported_lists() {
        let methods: SupportedAuthMethods = None::<String>.try_into().unwrap();
        assert_eq!(methods.as_ref().len(), ClientAuthMethod::ALL.len());

        let methods: SupportedAuthMethods = Some("private_key_jwt, none".to_string())
            .try_into()
            .unwrap();
        assert_eq!(
            methods.as_ref(),
            &[ClientAuthMethod::PrivateKeyJwt, ClientAuthMethod::None]
        );

        let methods: Result<SupportedAuthMethods> = "tls_client_auth".to_string().try_into();
        assert!(methods.is_err());

        let grants: SupportedGrantTypes = Some("authorization_code,client_credentials".to_string())
            .try_into()
            .unwrap();
        assert_eq!(
            grants.as_ref(),
            &[GrantType::AuthorizationCode, GrantType::ClientCredentials]
        );

        let algs: Result<AlgorithmList> = "RS256,none".to_string().try_into();
        assert!(algs.is_err());
    }

    #[test]
    fn test_algorithm_registry_from_config() {
        let config = Config {
            version: "test".to_string(),
            http_port: "8080".to_string().try_into().unwrap(),
            external_base: "https://op.example.com".to_string().try_into().unwrap(),
            storage_backend: "memory".to_string(),
            database_url: None,
            reject_unknown_metadata: "false".to_string().try_into().unwrap(),
            supported_auth_methods: Some("none".to_string()).try_into().unwrap(),
            supported_grant_types: None::<String>.try_into().unwrap(),
            supported_signing_algs: "ES256".to_string().try_into().unwrap(),
            supported_encryption_algs: "RSA-OAEP".to_string().try_into().unwrap(),
            supported_encryption_encs: "A128GCM".to_string().try_into().unwrap(),
        };

        let registry = config.algorithm_registry();
        assert!(registry.is_supported("token_endpoint_auth_method", "none"));
        assert!(!registry.is_supported("token_endpoint_auth_method", "client_secret_basic"));
        assert!(registry.is_supported("id_token_signed_response_alg", "ES256"));
        assert!(!registry.is_supported("id_token_signed_response_alg", "RS256"));
        assert!(registry.is_supported("userinfo_encrypted_response_enc", "A128GCM"));
    }
}
