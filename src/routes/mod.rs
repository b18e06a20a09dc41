use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::app_state::AppState;
use crate::models::job::JobId;
use crate::services::intake::IntakeError;
use crate::services::job_store::{JobStore, StoreError};
use crate::services::printer::Printer;

pub mod health;
pub mod metrics;
pub mod print;

/// Intake, status and health routes with state applied.
pub fn router<S: JobStore, P: Printer>(state: AppState<S, P>) -> Router {
    Router::new()
        .route("/health", get(health::health_check::<S, P>))
        .route("/api/v1/print-jobs", post(print::submit_print_job::<S, P>))
        .route("/api/v1/print-jobs/stats", get(print::queue_stats::<S, P>))
        .route("/api/v1/print-jobs/{id}", get(print::get_job_status::<S, P>))
        .with_state(state)
}

/// Error returned by API handlers, rendered as `{"error": code, "message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Job {0} not found")]
    NotFound(JobId),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "invalid_json"),
            ApiError::Intake(IntakeError::Validation(_) | IntakeError::Invalid(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::Intake(IntakeError::DeviceUnavailable { .. }) => {
                (StatusCode::BAD_REQUEST, "device_unavailable")
            }
            ApiError::Intake(IntakeError::Store(_)) | ApiError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
