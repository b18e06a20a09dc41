use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::services::job_store::{JobStore, StoreError};

/// One reclaim pass: return abandoned claims to the queue and refresh the
/// queue depth gauge. Returns the number of jobs reclaimed.
pub async fn sweep_once<S: JobStore>(store: &S, stale_threshold: Duration) -> Result<u64, StoreError> {
    let reclaimed = store.reclaim_stale(stale_threshold).await?;
    if reclaimed > 0 {
        metrics::counter!("print_jobs_reclaimed_total").increment(reclaimed);
        tracing::warn!(
            reclaimed,
            stale_after_secs = stale_threshold.as_secs(),
            "Reclaimed stale in-progress print jobs"
        );
    }

    let counts = store.status_counts().await?;
    metrics::gauge!("print_queue_depth").set(counts.pending as f64);
    tracing::debug!(
        pending = counts.pending,
        in_progress = counts.in_progress,
        "Reclaim sweep complete"
    );

    Ok(reclaimed)
}

/// Sweep every `period` until `shutdown` flips to true or its sender is dropped.
/// The first sweep runs immediately.
pub async fn run_reclaimer<S: JobStore>(
    store: Arc<S>,
    stale_threshold: Duration,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !*shutdown.borrow() {
        let keep_running = tokio::select! {
            _ = ticker.tick() => true,
            changed = shutdown.changed() => changed.is_ok(),
        };
        if !keep_running || *shutdown.borrow() {
            break;
        }

        if let Err(e) = sweep_once(store.as_ref(), stale_threshold).await {
            tracing::error!(error = %e, "Error reclaiming stale print jobs");
        }
    }

    tracing::info!("Reclaimer stopped");
}
