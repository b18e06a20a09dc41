//! Logging and metrics initialization shared by both binaries.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// JSON logs, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init();
}

/// Install the global Prometheus recorder and register metric descriptions.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    metrics::describe_counter!("print_jobs_submitted_total", "Print jobs accepted by intake");
    metrics::describe_counter!("print_jobs_completed_total", "Print jobs printed successfully");
    metrics::describe_counter!(
        "print_jobs_retried_total",
        "Failed prints returned to pending for another attempt"
    );
    metrics::describe_counter!(
        "print_jobs_failed_total",
        "Print jobs that exhausted every attempt"
    );
    metrics::describe_counter!(
        "print_jobs_reclaimed_total",
        "Abandoned in-progress jobs swept by the reclaimer"
    );
    metrics::describe_histogram!(
        "print_duration_seconds",
        "Time spent in a single printer call"
    );
    metrics::describe_gauge!("print_queue_depth", "Pending jobs at the last reclaim sweep");
}
