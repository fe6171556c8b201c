//! Handles POST /reg and GET /reg/{client_id} - OpenID Connect Dynamic Client Registration

use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
    errors::RegistrationError,
    http::{context::AppState, middleware_auth::RegistrationAccessToken},
    oauth::clients::events::RequestContext,
};

const JSON_ONLY: &str = "only application/json content-type POST bodies are supported";

/// `application/json`, optionally with media type parameters
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
}

pub async fn handle_register_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RegistrationError> {
    if !is_json_content_type(&headers) {
        return Err(RegistrationError::InvalidRequest(JSON_ONLY.to_string()));
    }

    let metadata: Value = serde_json::from_slice(&body).map_err(|_| {
        RegistrationError::InvalidRequest("request body is not valid JSON".to_string())
    })?;

    let service = state.registration_service.clone();

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let ctx = RequestContext::new(service.issuer(), "registration").with_user_agent(user_agent);

    let client = service.register_client(&metadata, &ctx).await?;

    Ok((StatusCode::CREATED, Json(service.record(&client))).into_response())
}

pub async fn handle_read_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    RegistrationAccessToken(token): RegistrationAccessToken,
) -> Result<Response, RegistrationError> {
    let service = state.registration_service.clone();

    let client = service.read_client(&client_id, &token).await?;

    Ok((StatusCode::OK, Json(service.record(&client))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_json_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json_content_type(&headers));

        for accepted in [
            "application/json",
            "application/json; charset=utf-8",
            "Application/JSON",
        ] {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(accepted));
            assert!(is_json_content_type(&headers), "{accepted}");
        }

        for rejected in [
            "text/plain",
            "application/x-www-form-urlencoded",
            "application/jsonp",
        ] {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(rejected));
            assert!(!is_json_content_type(&headers), "{rejected}");
        }
    }
}
