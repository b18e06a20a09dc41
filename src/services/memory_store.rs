use chrono::Utc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::models::job::{JobId, JobStatus, LabelSpec, PrintJob, PrintOutcome, StatusCounts};
use crate::services::job_store::{status_after_failure, JobStore, StoreError, ABANDONED_FINAL_ATTEMPT};

/// In-process job table. A single lock serializes every operation.
pub struct MemoryJobStore {
    max_job_attempts: i32,
    jobs: Mutex<Vec<PrintJob>>,
}

impl MemoryJobStore {
    pub fn new(max_job_attempts: i32) -> Self {
        Self {
            max_job_attempts,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every job in insertion order.
    pub async fn all(&self) -> Vec<PrintJob> {
        self.jobs.lock().await.clone()
    }
}

// Ids are assigned as index + 1 and rows are never removed.
fn slot(jobs: &mut [PrintJob], id: JobId) -> Option<&mut PrintJob> {
    let index = usize::try_from(id).ok()?.checked_sub(1)?;
    jobs.get_mut(index)
}

impl JobStore for MemoryJobStore {
    async fn insert(&self, spec: &LabelSpec) -> Result<JobId, StoreError> {
        let mut jobs = self.jobs.lock().await;
        let now = Utc::now();
        let id = jobs.len() as JobId + 1;
        jobs.push(PrintJob {
            id,
            spec: spec.clone(),
            status: JobStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn claim_next(&self) -> Result<Option<PrintJob>, StoreError> {
        let mut jobs = self.jobs.lock().await;
        let next = jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::Pending && j.attempts < self.max_job_attempts)
            .min_by_key(|j| (j.created_at, j.id));

        Ok(next.map(|job| {
            job.status = JobStatus::InProgress;
            job.attempts += 1;
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn resolve(
        &self,
        id: JobId,
        outcome: PrintOutcome,
    ) -> Result<Option<JobStatus>, StoreError> {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = slot(&mut jobs, id) else {
            return Ok(None);
        };
        if job.status != JobStatus::InProgress {
            return Ok(None);
        }

        job.status = match outcome {
            PrintOutcome::Printed => JobStatus::Done,
            PrintOutcome::Failed(reason) => {
                job.last_error = Some(reason);
                status_after_failure(job.attempts, self.max_job_attempts)
            }
        };
        job.updated_at = Utc::now();
        Ok(Some(job.status))
    }

    async fn reclaim_stale(&self, threshold: Duration) -> Result<u64, StoreError> {
        let now = Utc::now();
        let cutoff = match chrono::Duration::from_std(threshold) {
            Ok(threshold) => now.checked_sub_signed(threshold),
            Err(_) => None,
        };
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let mut jobs = self.jobs.lock().await;
        let mut reclaimed = 0;
        for job in jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::InProgress && j.updated_at < cutoff)
        {
            if job.attempts < self.max_job_attempts {
                job.status = JobStatus::Pending;
            } else {
                job.status = JobStatus::Failed;
                job.last_error = Some(ABANDONED_FINAL_ATTEMPT.to_string());
            }
            job.updated_at = now;
            reclaimed += 1;
        }
        Ok(reclaimed)
    }

    async fn get(&self, id: JobId) -> Result<Option<PrintJob>, StoreError> {
        let mut jobs = self.jobs.lock().await;
        Ok(slot(&mut jobs, id).cloned())
    }

    async fn status_counts(&self) -> Result<StatusCounts, StoreError> {
        let jobs = self.jobs.lock().await;
        let mut counts = StatusCounts::default();
        for job in jobs.iter() {
            counts.add(job.status, 1);
        }
        Ok(counts)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
