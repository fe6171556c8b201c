//! OpenID Connect Dynamic Client Registration CLI Tool
//!
//! Registers clients against an `oidc-registration` server and reads them
//! back with their registration access token.
//!
//! ## Usage Examples
//!
//! ### Register a new client
//! ```bash
//! oidc-registration-client --base-url http://localhost:8080 register \
//!   --name "My Client" \
//!   --redirect-uri "https://client.example.com/callback"
//!
//! # Public native client with extra metadata
//! oidc-registration-client --base-url http://localhost:8080 register \
//!   --application-type native \
//!   --redirect-uri "com.example.app:/callback" \
//!   --auth-method none \
//!   --metadata '{"contacts": ["ops@example.com"]}'
//! ```
//!
//! ### Read a registered client
//! ```bash
//! oidc-registration-client --base-url http://localhost:8080 get \
//!   --client-id "client_id_here" \
//!   --registration-token "registration_access_token_here"
//! ```
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error (network, parsing, etc.)
//! - 2: Registration error
//! - 3: Authentication error

use clap::{Args, Parser, Subcommand, ValueEnum};
use oidc_registration::oauth::types::{
    ApplicationType, ClientAuthMethod, GrantType, REGISTRATION_PATH, ResponseType,
};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::process;

#[derive(Parser)]
#[command(
    name = "oidc-registration-client",
    about = "OpenID Connect Dynamic Client Registration CLI Tool",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Base URL of the registration server
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Enable verbose output
    #[arg(short, long, help = "Enable verbose output for debugging")]
    verbose: bool,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "json",
        help = "Output format for responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// JSON formatted output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// Human-readable table format
    Table,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Register a new client
    Register(RegisterArgs),
    /// Read a registered client
    Get(GetArgs),
}

/// Arguments for client registration
#[derive(Args)]
struct RegisterArgs {
    /// Human-readable name for the client
    #[arg(long)]
    name: Option<String>,

    /// Redirect URIs (can be specified multiple times)
    #[arg(long = "redirect-uri")]
    redirect_uris: Vec<String>,

    /// Grant types, e.g. `authorization_code` (can be specified multiple times)
    #[arg(long = "grant-type")]
    grant_types: Vec<GrantType>,

    /// Response types, e.g. `"code id_token"` (can be specified multiple times)
    #[arg(long = "response-type")]
    response_types: Vec<ResponseType>,

    /// `web` or `native`
    #[arg(long = "application-type")]
    application_type: Option<ApplicationType>,

    /// Token endpoint authentication method
    #[arg(long = "auth-method")]
    auth_method: Option<ClientAuthMethod>,

    /// Scopes (space-separated)
    #[arg(long)]
    scope: Option<String>,

    /// Additional client metadata as a JSON object, merged into the request
    #[arg(long)]
    metadata: Option<String>,
}

/// Arguments for client retrieval
#[derive(Args)]
struct GetArgs {
    #[arg(long)]
    client_id: String,

    #[arg(long)]
    registration_token: String,

    /// Send the token as the `access_token` query parameter instead of a header
    #[arg(long)]
    query_token: bool,
}

/// Application errors
#[derive(Debug)]
enum AppError {
    /// Network or HTTP client errors
    Network(reqwest::Error),
    /// JSON parsing or serialization errors
    Json(serde_json::Error),
    /// Registration rejected by the server
    Registration(String),
    /// Authentication errors
    Authentication(String),
    /// General application errors
    General(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Network(err) => write!(f, "Network error: {}", err),
            AppError::Json(err) => write!(f, "JSON error: {}", err),
            AppError::Registration(msg) => write!(f, "Registration error: {}", msg),
            AppError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            AppError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Network(_) | AppError::Json(_) | AppError::General(_) => 1,
            AppError::Registration(_) => 2,
            AppError::Authentication(_) => 3,
        }
    }
}

/// Main application entry point
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Register(args) => register_client(&cli, args).await,
        Commands::Get(args) => get_client(&cli, args).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        process::exit(err.exit_code());
    }
}

fn registration_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), REGISTRATION_PATH)
}

/// Build the registration request body from the command line arguments
fn registration_body(args: &RegisterArgs) -> Result<Value, AppError> {
    let mut body = match &args.metadata {
        Some(metadata) => match serde_json::from_str(metadata) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(AppError::General(
                    "metadata must be a JSON object".to_string(),
                ));
            }
            Err(e) => return Err(AppError::General(format!("Invalid metadata JSON: {}", e))),
        },
        None => Map::new(),
    };

    if let Some(name) = &args.name {
        body.insert("client_name".to_string(), Value::from(name.as_str()));
    }
    if !args.redirect_uris.is_empty() {
        body.insert(
            "redirect_uris".to_string(),
            serde_json::to_value(&args.redirect_uris)?,
        );
    }
    if !args.grant_types.is_empty() {
        body.insert(
            "grant_types".to_string(),
            serde_json::to_value(&args.grant_types)?,
        );
    }
    if !args.response_types.is_empty() {
        body.insert(
            "response_types".to_string(),
            serde_json::to_value(&args.response_types)?,
        );
    }
    if let Some(application_type) = args.application_type {
        body.insert(
            "application_type".to_string(),
            Value::from(application_type.as_str()),
        );
    }
    if let Some(auth_method) = args.auth_method {
        body.insert(
            "token_endpoint_auth_method".to_string(),
            Value::from(auth_method.as_str()),
        );
    }
    if let Some(scope) = &args.scope {
        body.insert("scope".to_string(), Value::from(scope.as_str()));
    }

    Ok(Value::Object(body))
}

/// Register a new client
async fn register_client(cli: &Cli, args: &RegisterArgs) -> Result<(), AppError> {
    if cli.verbose {
        eprintln!("Registering new client with server: {}", cli.base_url);
    }

    let request = registration_body(args)?;

    if cli.verbose {
        eprintln!(
            "Registration request: {}",
            serde_json::to_string_pretty(&request)?
        );
    }

    let client = Client::new();
    let url = registration_endpoint(&cli.base_url);

    let response = client.post(&url).json(&request).send().await?;

    if cli.verbose {
        eprintln!("Response status: {}", response.status());
    }

    match response.status() {
        StatusCode::CREATED => {
            let registration: Value = response.json().await?;
            output_response(&cli.format, &registration)?;
            Ok(())
        }
        status => {
            let error_text = response.text().await?;
            Err(AppError::Registration(format!(
                "Registration failed with status {}: {}",
                status, error_text
            )))
        }
    }
}

/// Read a registered client
async fn get_client(cli: &Cli, args: &GetArgs) -> Result<(), AppError> {
    if cli.verbose {
        eprintln!("Getting client information for: {}", args.client_id);
    }

    let client = Client::new();
    let url = format!(
        "{}/{}",
        registration_endpoint(&cli.base_url),
        args.client_id
    );

    let request = if args.query_token {
        client
            .get(&url)
            .query(&[("access_token", args.registration_token.as_str())])
    } else {
        client.get(&url).bearer_auth(&args.registration_token)
    };
    let response = request.send().await?;

    if cli.verbose {
        eprintln!("Response status: {}", response.status());
    }

    match response.status() {
        StatusCode::OK => {
            let client_info: Value = response.json().await?;
            output_response(&cli.format, &client_info)?;
            Ok(())
        }
        StatusCode::UNAUTHORIZED => Err(AppError::Authentication(
            "Invalid registration access token".to_string(),
        )),
        status => {
            let error_text = response.text().await?;
            Err(AppError::Registration(format!(
                "Failed to get client with status {}: {}",
                status, error_text
            )))
        }
    }
}

/// Output response data in the requested format
fn output_response<T: Serialize>(format: &OutputFormat, data: &T) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(data)?);
        }
        OutputFormat::JsonPretty => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Table => {
            let json_value: Value = serde_json::to_value(data)?;
            print_table(&json_value, 0);
        }
    }
    Ok(())
}

/// Print data in table format (recursive for nested objects)
fn print_table(value: &Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) => {
                        println!("{}{}:", prefix, key);
                        print_table(val, indent + 1);
                    }
                    Value::Array(arr) => {
                        println!("{}{}:", prefix, key);
                        for item in arr {
                            println!("{}  - {}", prefix, format_value(item));
                        }
                    }
                    _ => {
                        println!("{}{}: {}", prefix, key, format_value(val));
                    }
                }
            }
        }
        _ => {
            println!("{}{}", prefix, format_value(value));
        }
    }
}

/// Format a JSON value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_else(|_| "invalid".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_body_merges_metadata() {
        let args = RegisterArgs {
            name: Some("CLI Client".to_string()),
            redirect_uris: vec!["https://client.example.com/cb".to_string()],
            grant_types: vec![GrantType::AuthorizationCode, GrantType::Implicit],
            response_types: vec![ResponseType::CodeIdToken],
            application_type: None,
            auth_method: Some(ClientAuthMethod::None),
            scope: None,
            metadata: Some(r#"{"contacts": ["ops@example.com"], "client_name": "overridden"}"#.to_string()),
        };

        let body = registration_body(&args).unwrap();
        assert_eq!(body["client_name"], "CLI Client");
        assert_eq!(body["contacts"][0], "ops@example.com");
        assert_eq!(body["response_types"][0], "code id_token");
        assert_eq!(body["grant_types"][1], "implicit");
        assert_eq!(body["token_endpoint_auth_method"], "none");
        assert!(body.get("application_type").is_none());
    }

    #[test]
    fn test_registration_body_rejects_non_object_metadata() {
        let args = RegisterArgs {
            name: None,
            redirect_uris: vec![],
            grant_types: vec![],
            response_types: vec![],
            application_type: None,
            auth_method: None,
            scope: None,
            metadata: Some("[1, 2]".to_string()),
        };
        assert!(matches!(
            registration_body(&args),
            Err(AppError::General(_))
        ));
    }

    #[test]
    fn test_registration_endpoint() {
        assert_eq!(
            registration_endpoint("http://localhost:8080/"),
            "http://localhost:8080/reg"
        );
    }
}
