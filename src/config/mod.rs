use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:5000"). Unused by the headless worker.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Raw TCP endpoint of the TSPL label printer (host:port)
    #[serde(default = "default_printer_addr")]
    pub printer_addr: String,

    /// Connect/write timeout for a single print, in milliseconds
    #[serde(default = "default_printer_timeout_ms")]
    pub printer_timeout_ms: u64,

    /// Reject requests up front when the printer cannot be reached
    #[serde(default = "default_true")]
    pub preflight_check: bool,

    /// Run the worker pool and reclaimer inside the HTTP process
    #[serde(default = "default_true")]
    pub embedded_workers: bool,

    #[serde(default = "default_max_print_count")]
    pub max_print_count: i32,

    #[serde(default = "default_max_barcode_data_length")]
    pub max_barcode_data_length: usize,

    #[serde(default = "default_max_top_text_length")]
    pub max_top_text_length: usize,

    #[serde(default = "default_max_job_attempts")]
    pub max_job_attempts: i32,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_stale_threshold_secs")]
    pub stale_threshold_secs: u64,

    #[serde(default = "default_reclaim_interval_secs")]
    pub reclaim_interval_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_printer_addr() -> String {
    "127.0.0.1:9100".to_string()
}

fn default_printer_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_max_print_count() -> i32 {
    1000
}

fn default_max_barcode_data_length() -> usize {
    100
}

fn default_max_top_text_length() -> usize {
    50
}

fn default_max_job_attempts() -> i32 {
    3
}

fn default_worker_count() -> usize {
    3
}

fn default_stale_threshold_secs() -> u64 {
    600
}

fn default_reclaim_interval_secs() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            max_job_attempts: self.max_job_attempts.max(1),
            worker_count: self.worker_count.max(1),
            stale_threshold: Duration::from_secs(self.stale_threshold_secs),
            reclaim_interval: Duration::from_secs(self.reclaim_interval_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn intake_limits(&self) -> IntakeLimits {
        IntakeLimits {
            max_print_count: self.max_print_count.max(1),
            max_barcode_data_length: self.max_barcode_data_length,
            max_top_text_length: self.max_top_text_length,
            preflight_check: self.preflight_check,
        }
    }

    pub fn printer_timeout(&self) -> Duration {
        Duration::from_millis(self.printer_timeout_ms)
    }
}

/// Tunables for the worker pool, store and reclaimer.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub max_job_attempts: i32,
    pub worker_count: usize,
    pub stale_threshold: Duration,
    pub reclaim_interval: Duration,
    pub poll_interval: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_job_attempts: default_max_job_attempts(),
            worker_count: default_worker_count(),
            stale_threshold: Duration::from_secs(default_stale_threshold_secs()),
            reclaim_interval: Duration::from_secs(default_reclaim_interval_secs()),
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
        }
    }
}

/// Limits applied by the intake gateway. Also the garde validation context.
#[derive(Debug, Clone)]
pub struct IntakeLimits {
    pub max_print_count: i32,
    pub max_barcode_data_length: usize,
    pub max_top_text_length: usize,
    pub preflight_check: bool,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_print_count: default_max_print_count(),
            max_barcode_data_length: default_max_barcode_data_length(),
            max_top_text_length: default_max_top_text_length(),
            preflight_check: true,
        }
    }
}
