//! Health check endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use store::Store;

use crate::envelope::{self, Status, timestamp};
use crate::health::BasicHealth;
use crate::state::AppState;

/// Body of a failed detailed check.
#[derive(Serialize)]
struct HealthFailure {
    status: Status,
    timestamp: String,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// GET /health: liveness.
pub async fn basic<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> envelope::SuccessEnvelope<BasicHealth> {
    envelope::success("Health check successful", state.health.basic())
}

/// GET /health/detailed: probes dependencies and reads host metrics.
///
/// Answers 200 for every overall status; 500 only when host metrics
/// cannot be read.
pub async fn detailed<S: Store>(State(state): State<Arc<AppState<S>>>) -> Response {
    match state.health.detailed().await {
        Ok(report) => envelope::success("Detailed health check successful", report).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "detailed health check failed");
            let body = HealthFailure {
                status: Status::Error,
                timestamp: timestamp(),
                message: "Failed to retrieve health information",
                error: state.config.exposes_error_details().then(|| err.to_string()),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
