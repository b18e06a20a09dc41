use std::sync::Arc;

use garde::Validate;
use tokio::sync::Notify;

use crate::config::IntakeLimits;
use crate::models::job::{JobId, LabelSpec, Orientation};
use crate::models::print::PrintRequest;
use crate::services::job_store::{JobStore, StoreError};
use crate::services::printer::Printer;

pub const DEFAULT_VENDOR_ID: &str = "0x0fe6";
pub const DEFAULT_PRODUCT_ID: &str = "0x8800";
pub const DEFAULT_WIDTH_MM: i32 = 45;
pub const DEFAULT_HEIGHT_MM: i32 = 35;

/// Validates inbound requests and turns them into pending jobs.
pub struct IntakeGateway<S, P> {
    store: Arc<S>,
    printer: Arc<P>,
    limits: IntakeLimits,
    wakeup: Arc<Notify>,
}

impl<S: JobStore, P: Printer> IntakeGateway<S, P> {
    pub fn new(store: Arc<S>, printer: Arc<P>, limits: IntakeLimits, wakeup: Arc<Notify>) -> Self {
        Self {
            store,
            printer,
            limits,
            wakeup,
        }
    }

    /// Validate, default and persist a request. Returns the new job id.
    pub async fn enqueue(&self, request: PrintRequest) -> Result<JobId, IntakeError> {
        let spec = normalize(request, &self.limits)?;

        if self.limits.preflight_check
            && !self
                .printer
                .device_reachable(&spec.vendor_id, &spec.product_id)
                .await
        {
            return Err(IntakeError::DeviceUnavailable {
                vendor_id: spec.vendor_id,
                product_id: spec.product_id,
            });
        }

        let id = self.store.insert(&spec).await?;
        self.wakeup.notify_one();

        metrics::counter!("print_jobs_submitted_total").increment(1);
        tracing::info!(
            job_id = id,
            barcode = %spec.barcode_data,
            copies = spec.print_count,
            "Print job enqueued"
        );
        Ok(id)
    }
}

/// Apply defaults, clamp the copy count, truncate the heading and validate.
pub fn normalize(request: PrintRequest, limits: &IntakeLimits) -> Result<LabelSpec, IntakeError> {
    request.validate_with(limits)?;

    let orientation = Orientation::try_from(request.direction.unwrap_or(0))
        .map_err(|e| IntakeError::Invalid(e.to_string()))?;

    Ok(LabelSpec {
        vendor_id: non_empty_or(request.vid, DEFAULT_VENDOR_ID),
        product_id: non_empty_or(request.pid, DEFAULT_PRODUCT_ID),
        width_mm: positive_or(request.size_x, DEFAULT_WIDTH_MM),
        height_mm: positive_or(request.size_y, DEFAULT_HEIGHT_MM),
        orientation,
        top_text: truncate_chars(request.top_text.unwrap_or_default(), limits.max_top_text_length),
        barcode_data: request.barcode_data,
        print_count: request.print_count.unwrap_or(1).clamp(1, limits.max_print_count),
    })
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn positive_or(value: Option<i32>, default: i32) -> i32 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
    text
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(#[from] garde::Report),

    #[error("{0}")]
    Invalid(String),

    #[error("Printer device not found, please check it is connected: {vendor_id}:{product_id}")]
    DeviceUnavailable {
        vendor_id: String,
        product_id: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
