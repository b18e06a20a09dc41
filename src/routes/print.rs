use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::models::job::{JobId, JobStatus, StatusCounts};
use crate::models::print::{EnqueueResponse, JobStatusResponse, PrintRequest};
use crate::routes::ApiError;
use crate::services::job_store::JobStore;
use crate::services::printer::Printer;

/// POST /api/v1/print-jobs: queue a label print.
pub async fn submit_print_job<S: JobStore, P: Printer>(
    State(state): State<AppState<S, P>>,
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    let job_id = state.intake.enqueue(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            job_id,
            status: JobStatus::Pending,
        }),
    ))
}

/// GET /api/v1/print-jobs/{id}: current status of a print job.
pub async fn get_job_status<S: JobStore, P: Printer>(
    State(state): State<AppState<S, P>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state
        .store
        .get(job_id)
        .await?
        .ok_or(ApiError::NotFound(job_id))?;

    Ok(Json(job.into()))
}

/// GET /api/v1/print-jobs/stats: number of jobs per status.
pub async fn queue_stats<S: JobStore, P: Printer>(
    State(state): State<AppState<S, P>>,
) -> Result<Json<StatusCounts>, ApiError> {
    Ok(Json(state.store.status_counts().await?))
}
