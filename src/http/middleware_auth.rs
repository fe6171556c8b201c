//! Registration access token extraction and response headers.
//!
//! A read request carries its registration access token either in the
//! `Authorization: Bearer` header or in the `access_token` query parameter,
//! never both.

use axum::extract::FromRequestParts;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use http::request::Parts;

use crate::errors::RegistrationError;
use crate::oauth::clients::registration::PresentedToken;

/// Extracted registration access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationAccessToken(pub PresentedToken);

fn header_token(parts: &Parts) -> Option<PresentedToken> {
    let value = parts.headers.get(header::AUTHORIZATION)?;

    let token = value
        .to_str()
        .ok()
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    Some(match token {
        Some(token) => PresentedToken::Bearer(token.to_string()),
        None => PresentedToken::Malformed,
    })
}

fn query_token(parts: &Parts) -> Option<PresentedToken> {
    let query = parts.uri.query()?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "access_token")
        .map(|(_, value)| {
            if value.is_empty() {
                PresentedToken::Malformed
            } else {
                PresentedToken::Bearer(value.into_owned())
            }
        })
}

impl<S> FromRequestParts<S> for RegistrationAccessToken
where
    S: Send + Sync,
{
    type Rejection = RegistrationError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match (header_token(parts), query_token(parts)) {
            (Some(token), None) | (None, Some(token)) => Ok(Self(token)),
            (Some(_), Some(_)) => Err(RegistrationError::InvalidRequest(
                "access token must be provided in only one of the Authorization header or the access_token query parameter".to_string(),
            )),
            (None, None) => Err(RegistrationError::InvalidRequest(
                "no access token provided".to_string(),
            )),
        }
    }
}

/// Registration responses carry credentials and must never be cached
pub async fn set_no_cache_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<RegistrationAccessToken, RegistrationError> {
        let (mut parts, _) = request.into_parts();
        RegistrationAccessToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let request = Request::builder()
            .uri("/reg/abc")
            .header("authorization", "Bearer secret-token")
            .body(())
            .unwrap();
        assert_eq!(
            extract(request).await.unwrap(),
            RegistrationAccessToken(PresentedToken::Bearer("secret-token".to_string()))
        );

        // Scheme is case-insensitive
        let request = Request::builder()
            .uri("/reg/abc")
            .header("authorization", "bearer secret-token")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await.unwrap().0,
            PresentedToken::Bearer(_)
        ));
    }

    #[tokio::test]
    async fn test_query_parameter() {
        let request = Request::builder()
            .uri("/reg/abc?access_token=a%2Bb")
            .body(())
            .unwrap();
        assert_eq!(
            extract(request).await.unwrap(),
            RegistrationAccessToken(PresentedToken::Bearer("a+b".to_string()))
        );
    }

    #[tokio::test]
    async fn test_malformed_credentials() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   "] {
            let request = Request::builder()
                .uri("/reg/abc")
                .header("authorization", value)
                .body(())
                .unwrap();
            assert_eq!(
                extract(request).await.unwrap().0,
                PresentedToken::Malformed,
                "{value}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_or_duplicated_token() {
        let request = Request::builder().uri("/reg/abc").body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(RegistrationError::InvalidRequest(_))
        ));

        let request = Request::builder()
            .uri("/reg/abc?access_token=one")
            .header("authorization", "Bearer two")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(RegistrationError::InvalidRequest(_))
        ));
    }
}
