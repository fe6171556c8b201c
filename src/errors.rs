//! Standardized error types following the `error-reg-<domain>-<number>` format.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header};
use serde_json::json;
use thiserror::Error;

/// Description returned for any registration access token failure.
pub const INVALID_TOKEN_DESCRIPTION: &str = "invalid registration access token";

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-reg-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when PORT cannot be parsed
    #[error("error-reg-config-2 Parsing PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-reg-config-3 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when the issuer base URL is not an absolute http(s) URL
    #[error("error-reg-config-4 Invalid issuer URL '{0}': {1}")]
    InvalidIssuer(String, String),

    /// Error when boolean string cannot be parsed
    #[error(
        "error-reg-config-5 Failed to parse boolean '{0}': expected true/false/1/0/yes/no/on/off"
    )]
    BoolParsingFailed(String),

    /// Error when a supported-value list contains an entry that is not recognized
    #[error("error-reg-config-6 Unsupported value '{1}' in {0}")]
    UnsupportedListValue(String, String),
}

/// Client registration errors
///
/// Every variant maps onto an OAuth error code. The string payload is the
/// human readable description returned to the caller.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Malformed request (wrong content type, missing credential, bad JSON)
    #[error("error-reg-client-1 Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client metadata
    #[error("error-reg-client-2 Invalid client metadata: {0}")]
    InvalidClientMetadata(String),

    /// Invalid redirect URI
    #[error("error-reg-client-3 Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    /// Client not found
    #[error("error-reg-client-4 Invalid client: {0}")]
    InvalidClient(String),

    /// Registration access token missing from the record or not matching it
    #[error("error-reg-client-5 Registration access token invalid")]
    InvalidToken,

    /// Unable to mint a unique client identifier
    #[error("error-reg-client-6 Credential generation failed: {0}")]
    CredentialGenerationFailed(String),

    /// Backing adapter failure
    #[error("error-reg-client-7 Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl RegistrationError {
    /// OAuth error code for the `error` member of the response body
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistrationError::InvalidRequest(_) => "invalid_request",
            RegistrationError::InvalidClientMetadata(_) => "invalid_client_metadata",
            RegistrationError::InvalidRedirectUri(_) => "invalid_redirect_uri",
            RegistrationError::InvalidClient(_) => "invalid_client",
            RegistrationError::InvalidToken => "invalid_token",
            RegistrationError::CredentialGenerationFailed(_) | RegistrationError::Storage(_) => {
                "server_error"
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistrationError::InvalidRequest(_)
            | RegistrationError::InvalidClientMetadata(_)
            | RegistrationError::InvalidRedirectUri(_)
            | RegistrationError::InvalidClient(_) => StatusCode::BAD_REQUEST,
            RegistrationError::InvalidToken => StatusCode::UNAUTHORIZED,
            RegistrationError::CredentialGenerationFailed(_) | RegistrationError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text for the `error_description` member.
    ///
    /// Server side failures never leak their cause.
    pub fn description(&self) -> &str {
        match self {
            RegistrationError::InvalidRequest(description)
            | RegistrationError::InvalidClientMetadata(description)
            | RegistrationError::InvalidRedirectUri(description)
            | RegistrationError::InvalidClient(description) => description,
            RegistrationError::InvalidToken => INVALID_TOKEN_DESCRIPTION,
            RegistrationError::CredentialGenerationFailed(_) | RegistrationError::Storage(_) => {
                "internal server error"
            }
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "registration request failed");
        }

        let body = Json(json!({
            "error": self.error_code(),
            "error_description": self.description(),
        }));

        let mut response = (status, body).into_response();
        if let RegistrationError::InvalidToken = self {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer error=\"invalid_token\""),
            );
        }
        response
    }
}

/// Database/storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when database connection fails
    #[error("error-reg-storage-1 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when query execution fails
    #[error("error-reg-storage-2 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when data serialization fails
    #[error("error-reg-storage-3 Data serialization failed: {0}")]
    SerializationFailed(String),

    /// Error when database operation fails
    #[error("error-reg-storage-4 Database error: {0}")]
    DatabaseError(String),

    /// Error when data validation fails
    #[error("error-reg-storage-5 Invalid data: {0}")]
    InvalidData(String),
}
