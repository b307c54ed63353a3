use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::warn;

use brandpulse_common::{AnalysisQuery, Coordinates};
use brandpulse_core::{AnalysisOutcome, PollOutcome};

use crate::AppState;

const MAX_FIELD_LEN: usize = 256;

/// Reject blank or oversized query fields before any identifier is
/// generated or any store is touched.
fn validate_query(query: &AnalysisQuery) -> Result<(), String> {
    for (name, value) in [
        ("brand", &query.brand),
        ("location", &query.location),
        ("category", &query.category),
    ] {
        if value.trim().is_empty() {
            return Err(format!("{name} must not be empty"));
        }
        if value.chars().count() > MAX_FIELD_LEN {
            return Err(format!("{name} too long (max {MAX_FIELD_LEN} characters)"));
        }
    }
    Ok(())
}

fn render_outcome(outcome: AnalysisOutcome) -> axum::response::Response {
    match outcome {
        AnalysisOutcome::Ready { results } => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ready", "results": results})),
        )
            .into_response(),
        AnalysisOutcome::InProgress { coordinates } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "in_progress",
                "user_id": coordinates.user_id,
                "session_id": coordinates.session_id,
            })),
        )
            .into_response(),
        AnalysisOutcome::Failed { reason } => {
            let code = if reason == "backend not configured" {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            (code, Json(serde_json::json!({"error": reason}))).into_response()
        }
    }
}

/// Start (or join) an analysis and return immediately. The caller polls
/// `/api/status/{user_id}/{session_id}` on its own timer.
pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> impl IntoResponse {
    if let Err(reason) = validate_query(&query) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": reason})),
        )
            .into_response();
    }
    render_outcome(state.orchestrator.start(&query).await)
}

/// Start (or join) an analysis and hold the connection until it reaches a
/// terminal outcome or the poll budget runs out.
pub async fn api_analyze_wait(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> impl IntoResponse {
    if let Err(reason) = validate_query(&query) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": reason})),
        )
            .into_response();
    }

    let coordinates = match state.orchestrator.start(&query).await {
        AnalysisOutcome::InProgress { coordinates } => coordinates,
        // Ready and Failed are already terminal.
        outcome => return render_outcome(outcome),
    };

    match state.poller.poll(&query, &coordinates, state.poll_budget).await {
        PollOutcome::Completed { results } => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ready", "results": results})),
        )
            .into_response(),
        PollOutcome::Failed { message } => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": message})),
        )
            .into_response(),
        PollOutcome::TimedOut => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(serde_json::json!({
                "error": "analysis did not complete in time",
                "user_id": coordinates.user_id,
                "session_id": coordinates.session_id,
            })),
        )
            .into_response(),
        PollOutcome::Errored { message } => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": message})),
        )
            .into_response(),
    }
}

/// Single status check for one attempt.
pub async fn api_status(
    State(state): State<Arc<AppState>>,
    Path((user_id, session_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let coordinates = Coordinates {
        user_id,
        session_id,
    };
    match state.orchestrator.status(&coordinates).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            warn!(
                user_id = coordinates.user_id.as_str(),
                session_id = coordinates.session_id.as_str(),
                error = %e,
                "Status check failed"
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
