//! OpenID Connect client registration types.
//!
//! Defines the metadata vocabulary, the persisted client entity, and the wire
//! record returned by the registration endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grant types a client may register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    Implicit,
    RefreshToken,
    ClientCredentials,
}

impl GrantType {
    pub const ALL: [GrantType; 4] = [
        GrantType::AuthorizationCode,
        GrantType::Implicit,
        GrantType::RefreshToken,
        GrantType::ClientCredentials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::Implicit => "implicit",
            GrantType::RefreshToken => "refresh_token",
            GrantType::ClientCredentials => "client_credentials",
        }
    }
}

/// Response types, including the OpenID Connect multi-valued combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "id_token")]
    IdToken,
    #[serde(rename = "id_token token")]
    IdTokenToken,
    #[serde(rename = "code id_token")]
    CodeIdToken,
    #[serde(rename = "code token")]
    CodeToken,
    #[serde(rename = "code id_token token")]
    CodeIdTokenToken,
    #[serde(rename = "none")]
    None,
}

impl ResponseType {
    pub const ALL: [ResponseType; 7] = [
        ResponseType::Code,
        ResponseType::IdToken,
        ResponseType::IdTokenToken,
        ResponseType::CodeIdToken,
        ResponseType::CodeToken,
        ResponseType::CodeIdTokenToken,
        ResponseType::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Code => "code",
            ResponseType::IdToken => "id_token",
            ResponseType::IdTokenToken => "id_token token",
            ResponseType::CodeIdToken => "code id_token",
            ResponseType::CodeToken => "code token",
            ResponseType::CodeIdTokenToken => "code id_token token",
            ResponseType::None => "none",
        }
    }

    /// Whether the response type issues an authorization code
    pub fn includes_code(&self) -> bool {
        self.as_str().split(' ').any(|part| part == "code")
    }

    /// Whether the response type returns tokens from the authorization endpoint
    pub fn includes_implicit(&self) -> bool {
        self.as_str()
            .split(' ')
            .any(|part| part == "token" || part == "id_token")
    }
}

/// Token endpoint client authentication methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    ClientSecretBasic,
    ClientSecretPost,
    ClientSecretJwt,
    PrivateKeyJwt,
    None,
}

impl ClientAuthMethod {
    pub const ALL: [ClientAuthMethod; 5] = [
        ClientAuthMethod::ClientSecretBasic,
        ClientAuthMethod::ClientSecretPost,
        ClientAuthMethod::ClientSecretJwt,
        ClientAuthMethod::PrivateKeyJwt,
        ClientAuthMethod::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientAuthMethod::ClientSecretBasic => "client_secret_basic",
            ClientAuthMethod::ClientSecretPost => "client_secret_post",
            ClientAuthMethod::ClientSecretJwt => "client_secret_jwt",
            ClientAuthMethod::PrivateKeyJwt => "private_key_jwt",
            ClientAuthMethod::None => "none",
        }
    }

    /// Methods that authenticate with the shared client secret
    pub fn uses_client_secret(&self) -> bool {
        matches!(
            self,
            ClientAuthMethod::ClientSecretBasic
                | ClientAuthMethod::ClientSecretPost
                | ClientAuthMethod::ClientSecretJwt
        )
    }

    /// Methods that authenticate with a signed JWT assertion
    pub fn uses_jwt_assertion(&self) -> bool {
        matches!(
            self,
            ClientAuthMethod::ClientSecretJwt | ClientAuthMethod::PrivateKeyJwt
        )
    }
}

/// Kind of application registering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    Web,
    Native,
}

impl ApplicationType {
    pub const ALL: [ApplicationType; 2] = [ApplicationType::Web, ApplicationType::Native];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationType::Web => "web",
            ApplicationType::Native => "native",
        }
    }
}

/// Subject identifier types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Public,
    Pairwise,
}

impl SubjectType {
    pub const ALL: [SubjectType; 2] = [SubjectType::Public, SubjectType::Pairwise];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Public => "public",
            SubjectType::Pairwise => "pairwise",
        }
    }
}

/// Error returned when a string is not a member of a metadata enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! enum_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = UnknownVariant;

                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    <$ty>::ALL
                        .into_iter()
                        .find(|variant| variant.as_str() == value)
                        .ok_or_else(|| UnknownVariant(value.to_string()))
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

enum_from_str!(
    GrantType,
    ResponseType,
    ClientAuthMethod,
    ApplicationType,
    SubjectType
);

/// Default ID token signing algorithm
pub const DEFAULT_ID_TOKEN_SIGNED_RESPONSE_ALG: &str = "RS256";

/// Validated and defaulted client metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub application_type: ApplicationType,
    pub grant_types: Vec<GrantType>,
    pub id_token_signed_response_alg: String,
    pub require_auth_time: bool,
    pub response_types: Vec<ResponseType>,
    pub token_endpoint_auth_method: ClientAuthMethod,
    pub redirect_uris: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tos_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_identifier_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiate_login_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<SubjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_acr_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uris: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_encrypted_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_encrypted_response_enc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_signed_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_encrypted_response_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_encrypted_response_enc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_object_signing_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_object_encryption_alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_object_encryption_enc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_signing_alg: Option<String>,
}

impl ClientMetadata {
    /// Every configured JWS algorithm, keyed by the field that carries it
    pub fn signing_algorithms(&self) -> Vec<(&'static str, &str)> {
        let mut algorithms = vec![(
            "id_token_signed_response_alg",
            self.id_token_signed_response_alg.as_str(),
        )];
        let optional = [
            (
                "userinfo_signed_response_alg",
                &self.userinfo_signed_response_alg,
            ),
            ("request_object_signing_alg", &self.request_object_signing_alg),
            (
                "token_endpoint_auth_signing_alg",
                &self.token_endpoint_auth_signing_alg,
            ),
        ];
        algorithms.extend(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.as_deref().map(|value| (field, value))),
        );
        algorithms
    }

    /// Every configured JWE key management algorithm, keyed by field
    pub fn encryption_algorithms(&self) -> Vec<(&'static str, &str)> {
        [
            (
                "id_token_encrypted_response_alg",
                &self.id_token_encrypted_response_alg,
            ),
            (
                "userinfo_encrypted_response_alg",
                &self.userinfo_encrypted_response_alg,
            ),
            (
                "request_object_encryption_alg",
                &self.request_object_encryption_alg,
            ),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

/// Registered client as persisted by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier
    pub client_id: String,
    /// Issue timestamp in epoch seconds
    pub client_id_issued_at: i64,
    /// Shared secret, only present when the secret policy requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Secret expiry in epoch seconds, `0` for non-expiring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_expires_at: Option<i64>,
    /// Bearer credential guarding reads of this record
    pub registration_access_token: String,
    #[serde(flatten)]
    pub metadata: ClientMetadata,
}

/// Wire representation returned by both registration endpoints
#[derive(Debug, Serialize)]
pub struct ClientRecord<'a> {
    #[serde(flatten)]
    pub client: &'a Client,
    pub registration_client_uri: String,
}

impl<'a> ClientRecord<'a> {
    /// Build the record, deriving `registration_client_uri` from the issuer
    pub fn new(client: &'a Client, issuer: &str) -> Self {
        Self {
            client,
            registration_client_uri: registration_client_uri(issuer, &client.client_id),
        }
    }
}

/// Path under the issuer where registration lives
pub const REGISTRATION_PATH: &str = "/reg";

/// `<issuer>/reg/<client_id>`
pub fn registration_client_uri(issuer: &str, client_id: &str) -> String {
    format!(
        "{}{}/{}",
        issuer.trim_end_matches('/'),
        REGISTRATION_PATH,
        client_id
    )
}
