use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Identifier assigned by the store at insertion. Never reused.
pub type JobId = i64;

/// Lifecycle status of a print job.
///
/// `Done` and `Failed` are terminal: once reached, no further transition occurs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Failed,
    Done,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// TSPL `DIRECTION` of the printed label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum Orientation {
    #[default]
    Normal,
    Reversed,
}

#[derive(Debug, thiserror::Error)]
#[error("direction must be 0 or 1, got {0}")]
pub struct InvalidOrientation(pub i16);

impl TryFrom<i16> for Orientation {
    type Error = InvalidOrientation;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Orientation::Normal),
            1 => Ok(Orientation::Reversed),
            other => Err(InvalidOrientation(other)),
        }
    }
}

impl From<Orientation> for i16 {
    fn from(value: Orientation) -> Self {
        match value {
            Orientation::Normal => 0,
            Orientation::Reversed => 1,
        }
    }
}

/// Immutable parameters of a label print, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSpec {
    pub vendor_id: String,
    pub product_id: String,
    pub width_mm: i32,
    pub height_mm: i32,
    pub orientation: Orientation,
    pub top_text: String,
    pub barcode_data: String,
    pub print_count: i32,
}

/// A persisted print job snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    pub spec: LabelSpec,
    pub status: JobStatus,
    /// Number of claims so far. Never decremented.
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of driving a claimed job through the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    Printed,
    Failed(String),
}

/// Number of jobs per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub done: i64,
    pub failed: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: JobStatus, count: i64) {
        match status {
            JobStatus::Pending => self.pending += count,
            JobStatus::InProgress => self.in_progress += count,
            JobStatus::Done => self.done += count,
            JobStatus::Failed => self.failed += count,
        }
    }
}
