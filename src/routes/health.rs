use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::job::StatusCounts;
use crate::services::job_store::JobStore;
use crate::services::printer::Printer;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: StoreHealth,
    /// Absent when the store could not be queried.
    pub queue: Option<StatusCounts>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}

/// GET /health: job store connectivity plus current queue depth.
pub async fn health_check<S: JobStore, P: Printer>(
    State(state): State<AppState<S, P>>,
) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();

    let (store, queue) = match state.store.health_check().await {
        Ok(()) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            let queue = match state.store.status_counts().await {
                Ok(counts) => Some(counts),
                Err(e) => {
                    tracing::warn!(error = %e, "Queue counts unavailable for health check");
                    None
                }
            };
            (
                StoreHealth {
                    reachable: true,
                    latency_ms: Some(latency_ms),
                },
                queue,
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Job store health check failed");
            (
                StoreHealth {
                    reachable: false,
                    latency_ms: None,
                },
                None,
            )
        }
    };

    let (status_code, status) = if store.reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store,
            queue,
        }),
    )
}
