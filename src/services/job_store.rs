use std::future::Future;
use std::time::Duration;

use crate::models::job::{JobId, JobStatus, LabelSpec, PrintJob, PrintOutcome, StatusCounts};

/// `last_error` recorded when the reclaimer fails a job that had no claim left.
pub const ABANDONED_FINAL_ATTEMPT: &str = "claim abandoned after final attempt";

/// Durable table of print jobs.
///
/// Every mutating operation is atomic with respect to the others. In particular
/// two concurrent `claim_next` calls never return the same job, and attempt
/// increments are never lost.
pub trait JobStore: Send + Sync + 'static {
    /// Create a job with status `pending`, zero attempts and both timestamps at now.
    fn insert(&self, spec: &LabelSpec) -> impl Future<Output = Result<JobId, StoreError>> + Send;

    /// Claim the oldest pending job that still has attempts left.
    ///
    /// The claimed job moves to `in_progress` with `attempts + 1` and a fresh
    /// `updated_at`; the returned snapshot reflects that. `None` when nothing
    /// is eligible.
    fn claim_next(&self) -> impl Future<Output = Result<Option<PrintJob>, StoreError>> + Send;

    /// Record the outcome of a claimed job.
    ///
    /// Success moves the job to `done`. Failure moves it back to `pending`
    /// while attempts remain, otherwise to `failed`. A job that is no longer
    /// `in_progress` is left untouched and `None` is returned.
    fn resolve(
        &self,
        id: JobId,
        outcome: PrintOutcome,
    ) -> impl Future<Output = Result<Option<JobStatus>, StoreError>> + Send;

    /// Return `in_progress` jobs not updated for `threshold` to `pending`.
    ///
    /// Jobs without a claim left are failed instead. `attempts` is not touched.
    /// Returns the number of jobs reclaimed or failed.
    fn reclaim_stale(
        &self,
        threshold: Duration,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn get(&self, id: JobId) -> impl Future<Output = Result<Option<PrintJob>, StoreError>> + Send;

    fn status_counts(&self) -> impl Future<Output = Result<StatusCounts, StoreError>> + Send;

    /// Check store connectivity (for health checks).
    fn health_check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Status a failed print moves to, given the attempts already recorded.
pub fn status_after_failure(attempts: i32, max_job_attempts: i32) -> JobStatus {
    if attempts < max_job_attempts {
        JobStatus::Pending
    } else {
        JobStatus::Failed
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt job row {id}: {reason}")]
    CorruptRow { id: JobId, reason: String },
}
