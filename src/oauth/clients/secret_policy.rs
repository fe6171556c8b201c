//! Decides whether a registration is issued a `client_secret`.

use crate::oauth::types::ClientMetadata;

/// JWE key management algorithms that derive the key from the client secret
fn is_symmetric_encryption_alg(alg: &str) -> bool {
    alg == "dir"
        || (alg.starts_with('A') && (alg.ends_with("KW") || alg.ends_with("GCMKW")))
        || alg.starts_with("PBES2-")
}

/// A secret is needed when the auth method uses one, or any HMAC signing or
/// symmetric encryption algorithm is configured.
pub fn needs_secret(metadata: &ClientMetadata) -> bool {
    if metadata.token_endpoint_auth_method.uses_client_secret() {
        return true;
    }

    if metadata
        .signing_algorithms()
        .iter()
        .any(|(_, alg)| alg.starts_with("HS"))
    {
        return true;
    }

    metadata
        .encryption_algorithms()
        .iter()
        .any(|(_, alg)| is_symmetric_encryption_alg(alg))
}
