use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::job::{
    JobId, JobStatus, LabelSpec, Orientation, PrintJob, PrintOutcome, StatusCounts,
};
use crate::services::job_store::{JobStore, StoreError, ABANDONED_FINAL_ATTEMPT};

/// PostgreSQL-backed job store.
///
/// Claims use `FOR UPDATE SKIP LOCKED` so concurrent workers never pick the
/// same row and never wait on each other's claim.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
    max_job_attempts: i32,
}

impl PgJobStore {
    pub fn new(pool: PgPool, max_job_attempts: i32) -> Self {
        Self {
            pool,
            max_job_attempts,
        }
    }
}

impl JobStore for PgJobStore {
    /// Insert a new pending print job
    async fn insert(&self, spec: &LabelSpec) -> Result<JobId, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO print_jobs (vendor_id, product_id, width_mm, height_mm, direction,
                                    top_text, barcode_data, print_count, status, attempts)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', 0)
            RETURNING id
            "#,
        )
        .bind(&spec.vendor_id)
        .bind(&spec.product_id)
        .bind(spec.width_mm)
        .bind(spec.height_mm)
        .bind(i16::from(spec.orientation))
        .bind(&spec.top_text)
        .bind(&spec.barcode_data)
        .bind(spec.print_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    /// Claim the oldest eligible pending job in a single statement
    async fn claim_next(&self) -> Result<Option<PrintJob>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE print_jobs
            SET status = 'in_progress',
                attempts = attempts + 1,
                updated_at = NOW()
            WHERE id = (
                SELECT id FROM print_jobs
                WHERE status = 'pending' AND attempts < $1
                ORDER BY created_at ASC, id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, vendor_id, product_id, width_mm, height_mm, direction, top_text,
                      barcode_data, print_count, status, attempts, last_error,
                      created_at, updated_at
            "#,
        )
        .bind(self.max_job_attempts)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    /// Record a print outcome against an in-progress job
    async fn resolve(
        &self,
        id: JobId,
        outcome: PrintOutcome,
    ) -> Result<Option<JobStatus>, StoreError> {
        let (printed, error) = match outcome {
            PrintOutcome::Printed => (true, None),
            PrintOutcome::Failed(reason) => (false, Some(reason)),
        };

        let row = sqlx::query(
            r#"
            UPDATE print_jobs
            SET status = CASE
                    WHEN $2 THEN 'done'
                    WHEN attempts < $3 THEN 'pending'
                    ELSE 'failed'
                END,
                last_error = CASE WHEN $2 THEN last_error ELSE $4 END,
                updated_at = NOW()
            WHERE id = $1 AND status = 'in_progress'
            RETURNING id, status
            "#,
        )
        .bind(id)
        .bind(printed)
        .bind(self.max_job_attempts)
        .bind(error)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(|r| status_from_row(r, id)).transpose()
    }

    /// Return abandoned claims to the queue (or fail them when no claim is left)
    async fn reclaim_stale(&self, threshold: Duration) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE print_jobs
            SET status = CASE WHEN attempts < $2 THEN 'pending' ELSE 'failed' END,
                last_error = CASE WHEN attempts < $2 THEN last_error ELSE $3 END,
                updated_at = NOW()
            WHERE status = 'in_progress'
              AND updated_at < NOW() - make_interval(secs => $1)
            "#,
        )
        .bind(threshold.as_secs_f64())
        .bind(self.max_job_attempts)
        .bind(ABANDONED_FINAL_ATTEMPT)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Get a job by ID
    async fn get(&self, id: JobId) -> Result<Option<PrintJob>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, vendor_id, product_id, width_mm, height_mm, direction, top_text,
                   barcode_data, print_count, status, attempts, last_error,
                   created_at, updated_at
            FROM print_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn status_counts(&self) -> Result<StatusCounts, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM print_jobs
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for row in &rows {
            let status = status_from_row(row, 0)?;
            counts.add(status, row.try_get("count")?);
        }
        Ok(counts)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn status_from_row(row: &PgRow, id: JobId) -> Result<JobStatus, StoreError> {
    let raw: String = row.try_get("status")?;
    raw.parse().map_err(|_| StoreError::CorruptRow {
        id,
        reason: format!("unknown status {raw:?}"),
    })
}

fn job_from_row(row: &PgRow) -> Result<PrintJob, StoreError> {
    let id: JobId = row.try_get("id")?;
    let direction: i16 = row.try_get("direction")?;
    let orientation = Orientation::try_from(direction).map_err(|e| StoreError::CorruptRow {
        id,
        reason: e.to_string(),
    })?;

    Ok(PrintJob {
        id,
        spec: LabelSpec {
            vendor_id: row.try_get("vendor_id")?,
            product_id: row.try_get("product_id")?,
            width_mm: row.try_get("width_mm")?,
            height_mm: row.try_get("height_mm")?,
            orientation,
            top_text: row.try_get("top_text")?,
            barcode_data: row.try_get("barcode_data")?,
            print_count: row.try_get("print_count")?,
        },
        status: status_from_row(row, id)?,
        attempts: row.try_get("attempts")?,
        last_error: row.try_get("last_error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
