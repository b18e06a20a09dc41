use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::QueueSettings;
use crate::models::job::{JobStatus, PrintOutcome};
use crate::services::job_store::{JobStore, StoreError};
use crate::services::printer::Printer;
use crate::services::reclaimer;

/// Claim one job and drive it through the printer.
/// Returns Ok(true) if a job was processed, Ok(false) if no job was available.
pub async fn process_next_job<S: JobStore, P: Printer>(
    worker_id: usize,
    store: &S,
    printer: &P,
) -> Result<bool, StoreError> {
    let job = match store.claim_next().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(
        worker_id,
        job_id = job.id,
        attempt = job.attempts,
        barcode = %job.spec.barcode_data,
        "Processing print job"
    );

    // No store lock is held while the device is busy
    let start = Instant::now();
    let outcome = match printer.print(&job.spec).await {
        Ok(()) => PrintOutcome::Printed,
        Err(e) => {
            tracing::warn!(worker_id, job_id = job.id, attempt = job.attempts, error = %e, "Print failed");
            PrintOutcome::Failed(e.to_string())
        }
    };
    metrics::histogram!("print_duration_seconds").record(start.elapsed().as_secs_f64());

    match store.resolve(job.id, outcome).await? {
        Some(JobStatus::Done) => {
            metrics::counter!("print_jobs_completed_total").increment(1);
            tracing::info!(worker_id, job_id = job.id, attempt = job.attempts, "Print job done");
        }
        Some(JobStatus::Pending) => {
            metrics::counter!("print_jobs_retried_total").increment(1);
            tracing::info!(worker_id, job_id = job.id, attempt = job.attempts, "Print job re-queued for retry");
        }
        Some(JobStatus::Failed) => {
            metrics::counter!("print_jobs_failed_total").increment(1);
            tracing::warn!(worker_id, job_id = job.id, attempt = job.attempts, "Print job failed after max attempts");
        }
        Some(JobStatus::InProgress) | None => {
            tracing::warn!(
                worker_id,
                job_id = job.id,
                "Job was reclaimed before it could be resolved, outcome dropped"
            );
        }
    }

    Ok(true)
}

/// Worker polling loop. Runs until `shutdown` flips to true or its sender is dropped.
pub async fn run_worker<S: JobStore, P: Printer>(
    worker_id: usize,
    store: Arc<S>,
    printer: Arc<P>,
    poll_interval: Duration,
    wakeup: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(worker_id, "Print worker started");

    while !*shutdown.borrow() {
        let keep_running = match process_next_job(worker_id, store.as_ref(), printer.as_ref()).await {
            Ok(true) => continue,
            Ok(false) => {
                tracing::trace!(worker_id, "No jobs available, sleeping");
                idle(poll_interval, Some(&wakeup), &mut shutdown).await
            }
            Err(e) => {
                tracing::error!(worker_id, error = %e, "Error processing job, will retry");
                idle(poll_interval, None, &mut shutdown).await
            }
        };
        if !keep_running {
            break;
        }
    }

    tracing::info!(worker_id, "Print worker stopped");
}

// Returns false once the shutdown sender is gone.
async fn idle(period: Duration, wakeup: Option<&Notify>, shutdown: &mut watch::Receiver<bool>) -> bool {
    let woken = async {
        match wakeup {
            Some(notify) => notify.notified().await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = sleep(period) => true,
        _ = woken => true,
        changed = shutdown.changed() => changed.is_ok(),
    }
}

/// Running worker pool plus its stale-claim reclaimer.
pub struct Dispatcher {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawn `worker_count` workers and one reclaimer on the current runtime.
    pub fn spawn<S: JobStore, P: Printer>(
        store: Arc<S>,
        printer: Arc<P>,
        settings: &QueueSettings,
        wakeup: Arc<Notify>,
    ) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(settings.worker_count + 1);

        for worker_id in 1..=settings.worker_count {
            tasks.push(tokio::spawn(run_worker(
                worker_id,
                store.clone(),
                printer.clone(),
                settings.poll_interval,
                wakeup.clone(),
                rx.clone(),
            )));
        }

        tasks.push(tokio::spawn(reclaimer::run_reclaimer(
            store,
            settings.stale_threshold,
            settings.reclaim_interval,
            rx,
        )));

        tracing::info!(workers = settings.worker_count, "Dispatcher started");
        Self { shutdown, tasks }
    }

    /// Stop claiming new work and wait for in-flight prints to resolve.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Dispatcher task panicked");
            }
        }
        tracing::info!("Dispatcher stopped");
    }
}
