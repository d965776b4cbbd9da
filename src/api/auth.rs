//! Request identity and API key validation
//!
//! User credential verification happens outside this service; whatever
//! authenticating front sits before it injects the verified owner id as a
//! request header. The optional API key guards service access itself.

use super::AppState;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Header carrying the verified owner id.
pub const OWNER_ID_HEADER: &str = "x-owner-id";

/// Extractor for the caller's owner id.
///
/// Rejects with 401 when the header is missing or empty.
pub struct OwnerId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match owner {
            Some(owner) => Ok(OwnerId(owner.to_string())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Owner identity required. Set X-Owner-Id: <owner id>"
                })),
            )
                .into_response()),
        }
    }
}

/// Authentication middleware
///
/// If `api_key` is configured in AppState, validates the Authorization header.
/// Expected format: `Authorization: Bearer <api_key>`
///
/// If no `api_key` is configured, all requests are allowed (local mode).
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // If no API key is configured, allow all requests
    let Some(expected_key) = &state.api_key else {
        return next.run(request).await;
    };

    // Check Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let provided_key = &header[7..]; // Skip "Bearer "

            if provided_key == expected_key {
                // Valid API key, proceed with request
                next.run(request).await
            } else {
                // Invalid API key
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": "Invalid API key"
                    })),
                )
                    .into_response()
            }
        }
        Some(_) => {
            // Authorization header exists but wrong format
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Invalid Authorization header format. Expected: Bearer <api_key>"
                })),
            )
                .into_response()
        }
        None => {
            // No Authorization header
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "API key required. Set Authorization: Bearer <api_key>"
                })),
            )
                .into_response()
        }
    }
}
