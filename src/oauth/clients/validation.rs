//! Client metadata validation.
//!
//! A raw submission is first type checked into a [`MetadataDraft`], then run
//! through [`RULES`] in order. The first violated rule ends validation, and
//! defaults are only applied once every rule passes.

use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use url::{Host, Url};

use crate::errors::RegistrationError;
use crate::oauth::algorithms::AlgorithmRegistry;
use crate::oauth::types::*;

/// Content encryption used when an `*_alg` is registered without its `*_enc`
pub const DEFAULT_CONTENT_ENCRYPTION: &str = "A128CBC-HS256";

/// Registered metadata vocabulary
const KNOWN_FIELDS: &[&str] = &[
    "redirect_uris",
    "response_types",
    "grant_types",
    "application_type",
    "token_endpoint_auth_method",
    "id_token_signed_response_alg",
    "require_auth_time",
    "client_name",
    "client_uri",
    "logo_uri",
    "policy_uri",
    "tos_uri",
    "jwks_uri",
    "jwks",
    "sector_identifier_uri",
    "initiate_login_uri",
    "scope",
    "subject_type",
    "contacts",
    "default_acr_values",
    "default_max_age",
    "request_uris",
    "post_logout_redirect_uris",
    "id_token_encrypted_response_alg",
    "id_token_encrypted_response_enc",
    "userinfo_signed_response_alg",
    "userinfo_encrypted_response_alg",
    "userinfo_encrypted_response_enc",
    "request_object_signing_alg",
    "request_object_encryption_alg",
    "request_object_encryption_enc",
    "token_endpoint_auth_signing_alg",
];

/// Build the error for a field, `redirect_uris` gets its own error code
fn field_error(field: &str, message: String) -> RegistrationError {
    if field == "redirect_uris" {
        RegistrationError::InvalidRedirectUri(message)
    } else {
        RegistrationError::InvalidClientMetadata(message)
    }
}

/// Typed accessors over the submitted JSON object
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    /// A JSON `null` is treated the same as an absent field
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn string(&self, field: &str) -> Result<Option<String>, RegistrationError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(field_error(field, format!("{field} must be a string"))),
        }
    }

    fn string_list(&self, field: &str) -> Result<Option<Vec<String>>, RegistrationError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let invalid = || field_error(field, format!("{field} must be an array of strings"));
        let items = value.as_array().ok_or_else(invalid)?;
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn boolean(&self, field: &str) -> Result<Option<bool>, RegistrationError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(field_error(field, format!("{field} must be a boolean"))),
        }
    }

    fn integer(&self, field: &str) -> Result<Option<u64>, RegistrationError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                field_error(field, format!("{field} must be a non-negative integer"))
            }),
        }
    }

    fn object(&self, field: &str) -> Result<Option<Value>, RegistrationError> {
        match self.get(field) {
            None => Ok(None),
            Some(value @ Value::Object(_)) => Ok(Some(value.clone())),
            Some(_) => Err(field_error(field, format!("{field} must be an object"))),
        }
    }

    fn enumerated<T: FromStr>(&self, field: &str) -> Result<Option<T>, RegistrationError> {
        self.string(field)?
            .map(|value| {
                value.parse::<T>().map_err(|_| {
                    field_error(field, format!("{field} has an unrecognized value '{value}'"))
                })
            })
            .transpose()
    }

    /// Parsed as a set: repeated values collapse, first occurrence wins
    fn enumerated_list<T: FromStr + PartialEq>(
        &self,
        field: &str,
    ) -> Result<Option<Vec<T>>, RegistrationError> {
        self.string_list(field)?
            .map(|values| {
                let mut parsed: Vec<T> = Vec::with_capacity(values.len());
                for value in &values {
                    let item = value.parse::<T>().map_err(|_| {
                        field_error(
                            field,
                            format!("{field} contains an unrecognized value '{value}'"),
                        )
                    })?;
                    if !parsed.contains(&item) {
                        parsed.push(item);
                    }
                }
                Ok(parsed)
            })
            .transpose()
    }
}

/// Type checked submission whose defaults have not been applied yet
#[derive(Debug, Default)]
pub struct MetadataDraft {
    pub redirect_uris: Option<Vec<String>>,
    pub grant_types: Option<Vec<GrantType>>,
    pub response_types: Option<Vec<ResponseType>>,
    pub application_type: Option<ApplicationType>,
    pub token_endpoint_auth_method: Option<ClientAuthMethod>,
    pub id_token_signed_response_alg: Option<String>,
    pub require_auth_time: Option<bool>,
    pub client_name: Option<String>,
    pub client_uri: Option<String>,
    pub logo_uri: Option<String>,
    pub policy_uri: Option<String>,
    pub tos_uri: Option<String>,
    pub jwks_uri: Option<String>,
    pub jwks: Option<Value>,
    pub sector_identifier_uri: Option<String>,
    pub initiate_login_uri: Option<String>,
    pub scope: Option<String>,
    pub subject_type: Option<SubjectType>,
    pub contacts: Option<Vec<String>>,
    pub default_acr_values: Option<Vec<String>>,
    pub default_max_age: Option<u64>,
    pub request_uris: Option<Vec<String>>,
    pub post_logout_redirect_uris: Option<Vec<String>>,
    pub id_token_encrypted_response_alg: Option<String>,
    pub id_token_encrypted_response_enc: Option<String>,
    pub userinfo_signed_response_alg: Option<String>,
    pub userinfo_encrypted_response_alg: Option<String>,
    pub userinfo_encrypted_response_enc: Option<String>,
    pub request_object_signing_alg: Option<String>,
    pub request_object_encryption_alg: Option<String>,
    pub request_object_encryption_enc: Option<String>,
    pub token_endpoint_auth_signing_alg: Option<String>,
}

impl MetadataDraft {
    fn read(object: &Map<String, Value>) -> Result<Self, RegistrationError> {
        let fields = FieldReader { object };

        Ok(Self {
            redirect_uris: fields.string_list("redirect_uris")?,
            response_types: fields.enumerated_list("response_types")?,
            grant_types: fields.enumerated_list("grant_types")?,
            application_type: fields.enumerated("application_type")?,
            token_endpoint_auth_method: fields.enumerated("token_endpoint_auth_method")?,
            id_token_signed_response_alg: fields.string("id_token_signed_response_alg")?,
            require_auth_time: fields.boolean("require_auth_time")?,
            client_name: fields.string("client_name")?,
            client_uri: fields.string("client_uri")?,
            logo_uri: fields.string("logo_uri")?,
            policy_uri: fields.string("policy_uri")?,
            tos_uri: fields.string("tos_uri")?,
            jwks_uri: fields.string("jwks_uri")?,
            jwks: fields.object("jwks")?,
            sector_identifier_uri: fields.string("sector_identifier_uri")?,
            initiate_login_uri: fields.string("initiate_login_uri")?,
            scope: fields.string("scope")?,
            subject_type: fields.enumerated("subject_type")?,
            contacts: fields.string_list("contacts")?,
            default_acr_values: fields.string_list("default_acr_values")?,
            default_max_age: fields.integer("default_max_age")?,
            request_uris: fields.string_list("request_uris")?,
            post_logout_redirect_uris: fields.string_list("post_logout_redirect_uris")?,
            id_token_encrypted_response_alg: fields.string("id_token_encrypted_response_alg")?,
            id_token_encrypted_response_enc: fields.string("id_token_encrypted_response_enc")?,
            userinfo_signed_response_alg: fields.string("userinfo_signed_response_alg")?,
            userinfo_encrypted_response_alg: fields.string("userinfo_encrypted_response_alg")?,
            userinfo_encrypted_response_enc: fields.string("userinfo_encrypted_response_enc")?,
            request_object_signing_alg: fields.string("request_object_signing_alg")?,
            request_object_encryption_alg: fields.string("request_object_encryption_alg")?,
            request_object_encryption_enc: fields.string("request_object_encryption_enc")?,
            token_endpoint_auth_signing_alg: fields.string("token_endpoint_auth_signing_alg")?,
        })
    }

    fn effective_application_type(&self) -> ApplicationType {
        self.application_type.unwrap_or(ApplicationType::Web)
    }

    fn effective_auth_method(&self) -> ClientAuthMethod {
        self.token_endpoint_auth_method
            .unwrap_or(ClientAuthMethod::ClientSecretBasic)
    }

    fn effective_grant_types(&self) -> Vec<GrantType> {
        self.grant_types
            .clone()
            .unwrap_or_else(|| vec![GrantType::AuthorizationCode])
    }

    fn effective_response_types(&self) -> Vec<ResponseType> {
        self.response_types
            .clone()
            .unwrap_or_else(|| vec![ResponseType::Code])
    }

    /// Explicitly submitted JOSE algorithm values keyed by field name
    fn algorithm_fields(&self) -> [(&'static str, Option<&String>); 10] {
        [
            (
                "id_token_signed_response_alg",
                self.id_token_signed_response_alg.as_ref(),
            ),
            (
                "id_token_encrypted_response_alg",
                self.id_token_encrypted_response_alg.as_ref(),
            ),
            (
                "id_token_encrypted_response_enc",
                self.id_token_encrypted_response_enc.as_ref(),
            ),
            (
                "userinfo_signed_response_alg",
                self.userinfo_signed_response_alg.as_ref(),
            ),
            (
                "userinfo_encrypted_response_alg",
                self.userinfo_encrypted_response_alg.as_ref(),
            ),
            (
                "userinfo_encrypted_response_enc",
                self.userinfo_encrypted_response_enc.as_ref(),
            ),
            (
                "request_object_signing_alg",
                self.request_object_signing_alg.as_ref(),
            ),
            (
                "request_object_encryption_alg",
                self.request_object_encryption_alg.as_ref(),
            ),
            (
                "request_object_encryption_enc",
                self.request_object_encryption_enc.as_ref(),
            ),
            (
                "token_endpoint_auth_signing_alg",
                self.token_endpoint_auth_signing_alg.as_ref(),
            ),
        ]
    }

    /// Apply defaults. Only called once every rule has passed.
    fn into_metadata(self) -> ClientMetadata {
        let application_type = self.effective_application_type();
        let token_endpoint_auth_method = self.effective_auth_method();
        let grant_types = self.effective_grant_types();
        let response_types = self.effective_response_types();

        let default_enc = |alg: &Option<String>, enc: Option<String>| {
            enc.or_else(|| alg.as_ref().map(|_| DEFAULT_CONTENT_ENCRYPTION.to_string()))
        };
        let id_token_encrypted_response_enc = default_enc(
            &self.id_token_encrypted_response_alg,
            self.id_token_encrypted_response_enc,
        );
        let userinfo_encrypted_response_enc = default_enc(
            &self.userinfo_encrypted_response_alg,
            self.userinfo_encrypted_response_enc,
        );
        let request_object_encryption_enc = default_enc(
            &self.request_object_encryption_alg,
            self.request_object_encryption_enc,
        );

        ClientMetadata {
            application_type,
            grant_types,
            id_token_signed_response_alg: self
                .id_token_signed_response_alg
                .unwrap_or_else(|| DEFAULT_ID_TOKEN_SIGNED_RESPONSE_ALG.to_string()),
            require_auth_time: self.require_auth_time.unwrap_or(false),
            response_types,
            token_endpoint_auth_method,
            redirect_uris: self.redirect_uris.unwrap_or_default(),
            client_name: self.client_name,
            client_uri: self.client_uri,
            logo_uri: self.logo_uri,
            policy_uri: self.policy_uri,
            tos_uri: self.tos_uri,
            jwks_uri: self.jwks_uri,
            jwks: self.jwks,
            sector_identifier_uri: self.sector_identifier_uri,
            initiate_login_uri: self.initiate_login_uri,
            scope: self.scope,
            subject_type: self.subject_type,
            contacts: self.contacts,
            default_acr_values: self.default_acr_values,
            default_max_age: self.default_max_age,
            request_uris: self.request_uris,
            post_logout_redirect_uris: self.post_logout_redirect_uris,
            id_token_encrypted_response_alg: self.id_token_encrypted_response_alg,
            id_token_encrypted_response_enc,
            userinfo_signed_response_alg: self.userinfo_signed_response_alg,
            userinfo_encrypted_response_alg: self.userinfo_encrypted_response_alg,
            userinfo_encrypted_response_enc,
            request_object_signing_alg: self.request_object_signing_alg,
            request_object_encryption_alg: self.request_object_encryption_alg,
            request_object_encryption_enc,
            token_endpoint_auth_signing_alg: self.token_endpoint_auth_signing_alg,
        }
    }
}

/// One entry of the cross-field rule table
pub struct Rule {
    pub name: &'static str,
    check: fn(&MetadataDraft, &dyn AlgorithmRegistry) -> Result<(), RegistrationError>,
}

impl Rule {
    pub fn check(
        &self,
        draft: &MetadataDraft,
        registry: &dyn AlgorithmRegistry,
    ) -> Result<(), RegistrationError> {
        (self.check)(draft, registry)
    }
}

/// Rules evaluated after type checking, in order
pub const RULES: &[Rule] = &[
    Rule {
        name: "redirect_uris",
        check: check_redirect_uris,
    },
    Rule {
        name: "grant_types_cover_response_types",
        check: check_response_grant_consistency,
    },
    Rule {
        name: "supported_values",
        check: check_supported_values,
    },
    Rule {
        name: "encryption_pairs",
        check: check_encryption_pairs,
    },
    Rule {
        name: "key_material",
        check: check_key_material,
    },
    Rule {
        name: "token_endpoint_auth_signing_alg",
        check: check_auth_signing_alg,
    },
    Rule {
        name: "uri_fields",
        check: check_uri_fields,
    },
];

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn check_redirect_uris(
    draft: &MetadataDraft,
    _registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    let redirect_uris = draft.redirect_uris.as_ref().ok_or_else(|| {
        RegistrationError::InvalidRedirectUri("redirect_uris is mandatory property".to_string())
    })?;

    if redirect_uris.is_empty() {
        return Err(RegistrationError::InvalidRedirectUri(
            "redirect_uris must contain at least one member".to_string(),
        ));
    }

    let application_type = draft.effective_application_type();
    for uri in redirect_uris {
        let parsed = Url::parse(uri).map_err(|_| {
            RegistrationError::InvalidRedirectUri(format!(
                "redirect_uris must only contain absolute URIs, got '{uri}'"
            ))
        })?;

        if application_type == ApplicationType::Web {
            match parsed.scheme() {
                "https" => {}
                "http" if is_loopback(&parsed) => {}
                "http" => {
                    return Err(RegistrationError::InvalidRedirectUri(format!(
                        "redirect_uris of web clients must not use http on a non-loopback host, got '{uri}'"
                    )));
                }
                scheme => {
                    return Err(RegistrationError::InvalidRedirectUri(format!(
                        "redirect_uris of web clients must use https, got scheme '{scheme}'"
                    )));
                }
            }
            if parsed.fragment().is_some() {
                return Err(RegistrationError::InvalidRedirectUri(format!(
                    "redirect_uris must not contain fragments, got '{uri}'"
                )));
            }
        }
    }

    Ok(())
}

fn check_response_grant_consistency(
    draft: &MetadataDraft,
    _registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    let grant_types = draft.effective_grant_types();
    let response_types = draft.effective_response_types();

    // Name whichever side the client actually sent
    let offending = if draft.grant_types.is_some() {
        "grant_types"
    } else {
        "response_types"
    };

    for response_type in &response_types {
        if response_type.includes_code() && !grant_types.contains(&GrantType::AuthorizationCode) {
            return Err(RegistrationError::InvalidClientMetadata(format!(
                "{offending} must contain 'authorization_code' when code is listed in response_types"
            )));
        }
        if response_type.includes_implicit() && !grant_types.contains(&GrantType::Implicit) {
            return Err(RegistrationError::InvalidClientMetadata(format!(
                "{offending} must contain 'implicit' when '{}' is listed in response_types",
                response_type.as_str()
            )));
        }
    }

    Ok(())
}

fn check_supported_values(
    draft: &MetadataDraft,
    registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    let unsupported = |field: &str, value: &str| {
        RegistrationError::InvalidClientMetadata(format!("{field} '{value}' is not supported"))
    };

    if let Some(method) = draft.token_endpoint_auth_method {
        if !registry.is_supported("token_endpoint_auth_method", method.as_str()) {
            return Err(unsupported("token_endpoint_auth_method", method.as_str()));
        }
    }

    for grant_type in draft.grant_types.iter().flatten() {
        if !registry.is_supported("grant_types", grant_type.as_str()) {
            return Err(unsupported("grant_types", grant_type.as_str()));
        }
    }

    for response_type in draft.response_types.iter().flatten() {
        if !registry.is_supported("response_types", response_type.as_str()) {
            return Err(unsupported("response_types", response_type.as_str()));
        }
    }

    for (field, value) in draft.algorithm_fields() {
        if let Some(value) = value {
            if !registry.is_supported(field, value) {
                return Err(unsupported(field, value));
            }
        }
    }

    Ok(())
}

fn check_encryption_pairs(
    draft: &MetadataDraft,
    _registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    let pairs = [
        (
            "id_token_encrypted_response_enc",
            &draft.id_token_encrypted_response_enc,
            "id_token_encrypted_response_alg",
            &draft.id_token_encrypted_response_alg,
        ),
        (
            "userinfo_encrypted_response_enc",
            &draft.userinfo_encrypted_response_enc,
            "userinfo_encrypted_response_alg",
            &draft.userinfo_encrypted_response_alg,
        ),
        (
            "request_object_encryption_enc",
            &draft.request_object_encryption_enc,
            "request_object_encryption_alg",
            &draft.request_object_encryption_alg,
        ),
    ];

    for (enc_field, enc, alg_field, alg) in pairs {
        if enc.is_some() && alg.is_none() {
            return Err(RegistrationError::InvalidClientMetadata(format!(
                "{enc_field} requires {alg_field} to be provided"
            )));
        }
    }

    Ok(())
}

fn check_key_material(
    draft: &MetadataDraft,
    _registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    if draft.jwks.is_some() && draft.jwks_uri.is_some() {
        return Err(RegistrationError::InvalidClientMetadata(
            "jwks and jwks_uri must not be used at the same time".to_string(),
        ));
    }

    if let Some(jwks) = &draft.jwks {
        if !jwks.get("keys").is_some_and(Value::is_array) {
            return Err(RegistrationError::InvalidClientMetadata(
                "jwks must be a JWK Set with a keys array".to_string(),
            ));
        }
    }

    if draft.effective_auth_method() == ClientAuthMethod::PrivateKeyJwt
        && draft.jwks.is_none()
        && draft.jwks_uri.is_none()
    {
        return Err(RegistrationError::InvalidClientMetadata(
            "jwks or jwks_uri is mandatory for private_key_jwt token_endpoint_auth_method"
                .to_string(),
        ));
    }

    Ok(())
}

fn check_auth_signing_alg(
    draft: &MetadataDraft,
    _registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    let Some(alg) = &draft.token_endpoint_auth_signing_alg else {
        return Ok(());
    };

    let method = draft.effective_auth_method();
    if !method.uses_jwt_assertion() {
        return Err(RegistrationError::InvalidClientMetadata(format!(
            "token_endpoint_auth_signing_alg is only valid with client_secret_jwt or private_key_jwt, not {}",
            method.as_str()
        )));
    }
    if alg == "none" {
        return Err(RegistrationError::InvalidClientMetadata(
            "token_endpoint_auth_signing_alg must not be none".to_string(),
        ));
    }

    let symmetric = alg.starts_with("HS");
    match method {
        ClientAuthMethod::ClientSecretJwt if !symmetric => {
            Err(RegistrationError::InvalidClientMetadata(format!(
                "token_endpoint_auth_signing_alg '{alg}' must be an HMAC algorithm for client_secret_jwt"
            )))
        }
        ClientAuthMethod::PrivateKeyJwt if symmetric => {
            Err(RegistrationError::InvalidClientMetadata(format!(
                "token_endpoint_auth_signing_alg '{alg}' must be an asymmetric algorithm for private_key_jwt"
            )))
        }
        _ => Ok(()),
    }
}

fn check_uri_fields(
    draft: &MetadataDraft,
    _registry: &dyn AlgorithmRegistry,
) -> Result<(), RegistrationError> {
    let single = [
        ("client_uri", &draft.client_uri, false),
        ("logo_uri", &draft.logo_uri, false),
        ("policy_uri", &draft.policy_uri, false),
        ("tos_uri", &draft.tos_uri, false),
        ("jwks_uri", &draft.jwks_uri, false),
        ("sector_identifier_uri", &draft.sector_identifier_uri, true),
        ("initiate_login_uri", &draft.initiate_login_uri, true),
    ];
    for (field, value, https_only) in single {
        if let Some(value) = value {
            check_absolute_uri(field, value, https_only)?;
        }
    }

    let lists = [
        ("request_uris", &draft.request_uris),
        ("post_logout_redirect_uris", &draft.post_logout_redirect_uris),
    ];
    for (field, values) in lists {
        for value in values.iter().flatten() {
            check_absolute_uri(field, value, false)?;
        }
    }

    Ok(())
}

fn check_absolute_uri(field: &str, value: &str, https_only: bool) -> Result<(), RegistrationError> {
    let parsed = Url::parse(value).map_err(|_| {
        RegistrationError::InvalidClientMetadata(format!(
            "{field} must be an absolute URI, got '{value}'"
        ))
    })?;
    if https_only && parsed.scheme() != "https" {
        return Err(RegistrationError::InvalidClientMetadata(format!(
            "{field} must use the https scheme"
        )));
    }
    Ok(())
}

/// Checks and normalizes raw registration submissions
#[derive(Clone)]
pub struct MetadataValidator {
    registry: Arc<dyn AlgorithmRegistry>,
    reject_unknown_fields: bool,
}

impl MetadataValidator {
    pub fn new(registry: Arc<dyn AlgorithmRegistry>) -> Self {
        Self {
            registry,
            reject_unknown_fields: false,
        }
    }

    /// Reject submissions carrying names outside the metadata vocabulary
    /// instead of dropping them
    pub fn reject_unknown_fields(mut self, reject: bool) -> Self {
        self.reject_unknown_fields = reject;
        self
    }

    pub fn validate(&self, raw: &Value) -> Result<ClientMetadata, RegistrationError> {
        let object = raw.as_object().ok_or_else(|| {
            RegistrationError::InvalidClientMetadata(
                "client metadata must be a JSON object".to_string(),
            )
        })?;

        if self.reject_unknown_fields {
            let mut unknown: Vec<&str> = object
                .keys()
                .map(String::as_str)
                .filter(|key| !KNOWN_FIELDS.contains(key))
                .collect();
            if !unknown.is_empty() {
                unknown.sort_unstable();
                return Err(RegistrationError::InvalidClientMetadata(format!(
                    "unrecognized metadata: {}",
                    unknown.join(", ")
                )));
            }
        }

        let draft = MetadataDraft::read(object)?;

        for rule in RULES {
            if let Err(error) = rule.check(&draft, self.registry.as_ref()) {
                tracing::debug!(rule = rule.name, error = %error, "client metadata rejected");
                return Err(error);
            }
        }

        Ok(draft.into_metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::algorithms::StaticAlgorithmRegistry;
    use serde_json::json;

    fn validator() -> MetadataValidator {
        MetadataValidator::new(Arc::new(StaticAlgorithmRegistry::default()))
    }

    fn assert_metadata_error(result: Result<ClientMetadata, RegistrationError>, needle: &str) {
        match result {
            Err(RegistrationError::InvalidClientMetadata(description)) => assert!(
                description.contains(needle),
                "expected '{needle}' in '{description}'"
            ),
            other => panic!("expected invalid_client_metadata, got {:?}", other),
        }
    }

    fn assert_redirect_error(result: Result<ClientMetadata, RegistrationError>) {
        match result {
            Err(RegistrationError::InvalidRedirectUri(description)) => {
                assert!(description.contains("redirect_uris"), "{description}")
            }
            other => panic!("expected invalid_redirect_uri, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_are_applied() {
        let metadata = validator()
            .validate(&json!({ "redirect_uris": ["https://client.example.com/cb"] }))
            .unwrap();

        assert_eq!(metadata.application_type, ApplicationType::Web);
        assert_eq!(metadata.grant_types, vec![GrantType::AuthorizationCode]);
        assert_eq!(metadata.response_types, vec![ResponseType::Code]);
        assert_eq!(
            metadata.token_endpoint_auth_method,
            ClientAuthMethod::ClientSecretBasic
        );
        assert_eq!(metadata.id_token_signed_response_alg, "RS256");
        assert!(!metadata.require_auth_time);
        assert_eq!(metadata.redirect_uris, vec!["https://client.example.com/cb"]);
    }

    #[test]
    fn test_missing_redirect_uris() {
        assert_redirect_error(validator().validate(&json!({})));
        assert_redirect_error(validator().validate(&json!({ "redirect_uris": [] })));
        assert_redirect_error(validator().validate(&json!({ "redirect_uris": null })));
    }

    #[test]
    fn test_redirect_uri_type_error_uses_redirect_code() {
        assert_redirect_error(
            validator().validate(&json!({ "redirect_uris": "https://client.example.com/cb" })),
        );
        assert_redirect_error(validator().validate(&json!({ "redirect_uris": [42] })));
    }

    #[test]
    fn test_web_redirect_uri_rules() {
        assert_redirect_error(validator().validate(&json!({ "redirect_uris": ["/relative/cb"] })));
        assert_redirect_error(
            validator().validate(&json!({ "redirect_uris": ["http://client.example.com/cb"] })),
        );
        assert_redirect_error(
            validator().validate(&json!({ "redirect_uris": ["https://client.example.com/cb#frag"] })),
        );

        for loopback in [
            "http://localhost:3000/cb",
            "http://127.0.0.1/cb",
            "http://[::1]:8080/cb",
        ] {
            assert!(
                validator()
                    .validate(&json!({ "redirect_uris": [loopback] }))
                    .is_ok(),
                "{loopback} should be accepted"
            );
        }

        // Only the loopback host itself qualifies
        assert_redirect_error(
            validator().validate(&json!({ "redirect_uris": ["http://localhost.example.com/cb"] })),
        );

        for scheme_only in [
            "javascript:alert(1)",
            "data:text/html,hi",
            "ftp://client.example.com/cb",
            "com.example.app:/callback",
        ] {
            assert_redirect_error(validator().validate(&json!({ "redirect_uris": [scheme_only] })));
        }
    }

    #[test]
    fn test_known_fields_cover_registered_metadata() {
        let metadata = validator()
            .validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "token_endpoint_auth_method": "private_key_jwt",
                "token_endpoint_auth_signing_alg": "RS256",
                "jwks_uri": "https://client.example.com/jwks",
                "client_name": "Example",
                "contacts": ["ops@example.com"],
                "default_max_age": 3600,
                "id_token_encrypted_response_alg": "RSA-OAEP",
            }))
            .unwrap();

        let serialized = serde_json::to_value(&metadata).unwrap();
        for key in serialized.as_object().unwrap().keys() {
            assert!(KNOWN_FIELDS.contains(&key.as_str()), "{key} is not a known field");
        }
    }

    #[test]
    fn test_grant_and_response_types_collapse_duplicates() {
        let metadata = validator()
            .validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "grant_types": ["authorization_code", "refresh_token", "authorization_code"],
                "response_types": ["code", "code"],
            }))
            .unwrap();

        assert_eq!(
            metadata.grant_types,
            vec![GrantType::AuthorizationCode, GrantType::RefreshToken]
        );
        assert_eq!(metadata.response_types, vec![ResponseType::Code]);
    }

    #[test]
    fn test_native_redirect_uris_allow_custom_schemes() {
        let metadata = validator()
            .validate(&json!({
                "application_type": "native",
                "redirect_uris": ["com.example.app:/callback", "http://client.example.com/cb"],
            }))
            .unwrap();
        assert_eq!(metadata.application_type, ApplicationType::Native);
    }

    #[test]
    fn test_unrecognized_grant_type() {
        assert_metadata_error(
            validator().validate(&json!({
                "grant_types": ["this is clearly wrong"],
                "redirect_uris": ["https://client.example.com/cb"],
            })),
            "grant_types",
        );
    }

    #[test]
    fn test_response_types_require_matching_grants() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "grant_types": ["implicit"],
            })),
            "grant_types",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "response_types": ["id_token"],
            })),
            "response_types",
        );

        let metadata = validator()
            .validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "response_types": ["code id_token"],
                "grant_types": ["authorization_code", "implicit"],
            }))
            .unwrap();
        assert_eq!(metadata.response_types, vec![ResponseType::CodeIdToken]);
    }

    #[test]
    fn test_type_errors_name_the_field() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "require_auth_time": "yes",
            })),
            "require_auth_time",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "default_max_age": -1,
            })),
            "default_max_age",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "token_endpoint_auth_method": "magic",
            })),
            "token_endpoint_auth_method",
        );
        assert_metadata_error(validator().validate(&json!(["not", "an", "object"])), "object");
    }

    #[test]
    fn test_unknown_fields() {
        let body = json!({
            "redirect_uris": ["https://client.example.com/cb"],
            "favourite_colour": "blue",
        });

        assert!(validator().validate(&body).is_ok());
        assert_metadata_error(
            validator().reject_unknown_fields(true).validate(&body),
            "favourite_colour",
        );
    }

    #[test]
    fn test_registry_rejects_unsupported_values() {
        let registry = StaticAlgorithmRegistry::default().with_signing_algs(&["ES256"]);
        let validator = MetadataValidator::new(Arc::new(registry));

        assert_metadata_error(
            validator.validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "id_token_signed_response_alg": "HS256",
            })),
            "id_token_signed_response_alg",
        );

        assert_metadata_error(
            self::validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "grant_types": ["authorization_code", "client_credentials"],
            })),
            "grant_types",
        );
    }

    #[test]
    fn test_invalid_explicit_value_is_not_replaced_by_default() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "id_token_signed_response_alg": "XX999",
            })),
            "id_token_signed_response_alg",
        );
    }

    #[test]
    fn test_encryption_enc_requires_alg_and_is_defaulted() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "id_token_encrypted_response_enc": "A128GCM",
            })),
            "id_token_encrypted_response_alg",
        );

        let metadata = validator()
            .validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "userinfo_encrypted_response_alg": "RSA-OAEP",
            }))
            .unwrap();
        assert_eq!(
            metadata.userinfo_encrypted_response_enc.as_deref(),
            Some(DEFAULT_CONTENT_ENCRYPTION)
        );
    }

    #[test]
    fn test_key_material_rules() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "jwks": { "keys": [] },
                "jwks_uri": "https://client.example.com/jwks",
            })),
            "jwks_uri",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "token_endpoint_auth_method": "private_key_jwt",
            })),
            "private_key_jwt",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "jwks": { "not_keys": true },
            })),
            "jwks",
        );
        assert!(
            validator()
                .validate(&json!({
                    "redirect_uris": ["https://client.example.com/cb"],
                    "token_endpoint_auth_method": "private_key_jwt",
                    "jwks_uri": "https://client.example.com/jwks",
                }))
                .is_ok()
        );
    }

    #[test]
    fn test_auth_signing_alg_must_match_method() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "token_endpoint_auth_signing_alg": "HS256",
            })),
            "client_secret_basic",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "token_endpoint_auth_method": "client_secret_jwt",
                "token_endpoint_auth_signing_alg": "RS256",
            })),
            "HMAC",
        );
        assert!(
            validator()
                .validate(&json!({
                    "redirect_uris": ["https://client.example.com/cb"],
                    "token_endpoint_auth_method": "client_secret_jwt",
                    "token_endpoint_auth_signing_alg": "HS256",
                }))
                .is_ok()
        );
    }

    #[test]
    fn test_uri_fields_must_be_absolute() {
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "logo_uri": "logo.png",
            })),
            "logo_uri",
        );
        assert_metadata_error(
            validator().validate(&json!({
                "redirect_uris": ["https://client.example.com/cb"],
                "initiate_login_uri": "http://client.example.com/login",
            })),
            "initiate_login_uri",
        );
    }

    #[test]
    fn test_first_violated_rule_wins() {
        // Both redirect_uris and grant_types are wrong; redirect_uris is checked first.
        assert_redirect_error(validator().validate(&json!({
            "redirect_uris": ["http://client.example.com/cb"],
            "grant_types": ["implicit"],
        })));
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<&str> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names.first(), Some(&"redirect_uris"));
        assert_eq!(names.get(1), Some(&"grant_types_cover_response_types"));
        assert_eq!(names.get(2), Some(&"supported_values"));
    }
}
