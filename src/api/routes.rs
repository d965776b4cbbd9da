//! HTTP route handlers for the API

use super::auth::OwnerId;
use super::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;

// ============================================================================
// Health Check
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartSessionRequest {
    /// Absent means a focus session
    pub is_break: bool,
}

pub async fn start_session(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    match state.sessions.start(&owner, req.is_break) {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OwnerId(owner): OwnerId,
) -> Response {
    match state.sessions.end(&id, &owner) {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_sessions(State(state): State<AppState>, OwnerId(owner): OwnerId) -> Response {
    match state.sessions.list(&owner) {
        Ok(sessions) => Json(serde_json::json!({
            "total": sessions.len(),
            "sessions": sessions,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Seconds of focus per calendar day, ISO date keys, 7 entries
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStatsResponse {
    pub daily_durations: BTreeMap<String, i64>,
}

pub async fn weekly_stats(State(state): State<AppState>, OwnerId(owner): OwnerId) -> Response {
    match state.stats.weekly(&owner) {
        Ok(daily_durations) => Json(WeeklyStatsResponse { daily_durations }).into_response(),
        Err(e) => error_response(e),
    }
}

/// Seconds of focus per hour of day, keys 0..=23
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyStatsResponse {
    pub hourly_durations: BTreeMap<u32, i64>,
}

pub async fn hourly_stats(State(state): State<AppState>, OwnerId(owner): OwnerId) -> Response {
    match state.stats.hourly(&owner) {
        Ok(hourly_durations) => Json(HourlyStatsResponse { hourly_durations }).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Map a core error onto the wire: 404/403/409 for the domain errors, 500
/// for store and internal failures.
fn error_response(err: CoreError) -> Response {
    let status = match &err {
        CoreError::NotFound(..) => StatusCode::NOT_FOUND,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::InvalidState(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "request failed");
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_defaults_to_focus() {
        let req: StartSessionRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.is_break);

        let req: StartSessionRequest = serde_json::from_str(r#"{"isBreak": true}"#).unwrap();
        assert!(req.is_break);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                CoreError::NotFound("Session", "x".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Forbidden("nope".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                CoreError::InvalidState("done".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::Api("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(error_response(err).status(), expected);
        }
    }
}
