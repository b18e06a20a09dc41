use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::config::IntakeLimits;
use crate::models::job::{JobId, JobStatus, PrintJob};

/// Inbound print request. Every field except `barcodeData` is optional and
/// defaulted by the intake gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[garde(context(IntakeLimits))]
pub struct PrintRequest {
    #[garde(length(max = 16))]
    pub vid: Option<String>,

    #[garde(length(max = 16))]
    pub pid: Option<String>,

    /// Label width in mm. Zero means unset.
    #[garde(range(min = 0, max = 1000))]
    pub size_x: Option<i32>,

    /// Label height in mm. Zero means unset.
    #[garde(range(min = 0, max = 1000))]
    pub size_y: Option<i32>,

    #[garde(range(min = 0, max = 1))]
    pub direction: Option<i16>,

    /// Truncated, never rejected.
    #[garde(skip)]
    pub top_text: Option<String>,

    #[serde(default)]
    #[garde(custom(barcode_within_limit))]
    pub barcode_data: String,

    /// Clamped, never rejected.
    #[garde(skip)]
    pub print_count: Option<i32>,
}

fn barcode_within_limit(value: &str, limits: &IntakeLimits) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("barcodeData is required"));
    }
    if value.chars().count() > limits.max_barcode_data_length {
        return Err(garde::Error::new(format!(
            "barcodeData must not exceed {} chars",
            limits.max_barcode_data_length
        )));
    }
    Ok(())
}

/// Response after a print job is accepted.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Response for querying job status.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PrintJob> for JobStatusResponse {
    fn from(job: PrintJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            attempts: job.attempts,
            last_error: job.last_error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}
