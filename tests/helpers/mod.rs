//! Shared test doubles and server harness

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use label_print_queue::{
    app_state::AppState,
    config::{IntakeLimits, QueueSettings},
    models::job::{JobId, JobStatus, LabelSpec, Orientation, PrintJob},
    routes,
    services::{
        job_store::JobStore,
        memory_store::MemoryJobStore,
        printer::{Printer, PrinterError},
        worker_pool::Dispatcher,
    },
};
use tokio::sync::Notify;
use tokio::time::sleep;

/// Printer double that fails the first `failures` prints of each barcode.
pub struct ScriptedPrinter {
    failures: usize,
    reachable: bool,
    delay: Duration,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl ScriptedPrinter {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            reachable: true,
            delay: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    pub fn healthy() -> Self {
        Self::failing_first(0)
    }

    pub fn always_failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::healthy()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls_for(&self, barcode: &str) -> usize {
        self.calls.lock().unwrap().get(barcode).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl Printer for ScriptedPrinter {
    async fn print(&self, spec: &LabelSpec) -> Result<(), PrinterError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.total.fetch_add(1, Ordering::SeqCst);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(spec.barcode_data.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if call <= self.failures {
            Err(PrinterError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "device busy",
            )))
        } else {
            Ok(())
        }
    }

    async fn device_reachable(&self, _vendor_id: &str, _product_id: &str) -> bool {
        self.reachable
    }
}

pub fn label(barcode: &str) -> LabelSpec {
    LabelSpec {
        vendor_id: "0x0fe6".to_string(),
        product_id: "0x8800".to_string(),
        width_mm: 45,
        height_mm: 35,
        orientation: Orientation::Normal,
        top_text: "PRICE: 20000".to_string(),
        barcode_data: barcode.to_string(),
        print_count: 1,
    }
}

/// Fast-polling settings for tests.
pub fn quick_settings(max_job_attempts: i32, worker_count: usize) -> QueueSettings {
    QueueSettings {
        max_job_attempts,
        worker_count,
        stale_threshold: Duration::from_secs(600),
        reclaim_interval: Duration::from_secs(600),
        poll_interval: Duration::from_millis(10),
    }
}

/// Poll the store until the job reaches a terminal state (or ~5s pass).
pub async fn wait_for_terminal<S: JobStore>(store: &S, id: JobId) -> PrintJob {
    for _ in 0..500 {
        let job = store.get(id).await.unwrap().expect("job not found");
        if job.status.is_terminal() {
            return job;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not reach a terminal state");
}

/// Poll the store until every job is terminal.
pub async fn wait_for_all_terminal(store: &MemoryJobStore) -> Vec<PrintJob> {
    for _ in 0..500 {
        let jobs = store.all().await;
        if jobs.iter().all(|j| j.status.is_terminal()) {
            return jobs;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("jobs did not drain");
}

/// API router on an ephemeral port backed by the in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryJobStore>,
    pub printer: Arc<ScriptedPrinter>,
    dispatcher: Option<Dispatcher>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Intake only; nothing drains the queue.
    pub async fn spawn(printer: ScriptedPrinter) -> Self {
        Self::start(printer, IntakeLimits::default(), None).await
    }

    /// Intake plus an embedded worker pool.
    pub async fn spawn_with_workers(printer: ScriptedPrinter, settings: QueueSettings) -> Self {
        Self::start(printer, IntakeLimits::default(), Some(settings)).await
    }

    async fn start(
        printer: ScriptedPrinter,
        limits: IntakeLimits,
        settings: Option<QueueSettings>,
    ) -> Self {
        let max_job_attempts = settings.as_ref().map_or(3, |s| s.max_job_attempts);
        let store = Arc::new(MemoryJobStore::new(max_job_attempts));
        let printer = Arc::new(printer);
        let wakeup = Arc::new(Notify::new());

        let dispatcher = settings
            .map(|s| Dispatcher::spawn(store.clone(), printer.clone(), &s, wakeup.clone()));

        let state = AppState::new(store.clone(), printer.clone(), limits, wakeup);
        let app = routes::router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            printer,
            dispatcher,
            handle,
        }
    }

    pub async fn stop(mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.shutdown().await;
        }
        self.handle.abort();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn assert_status(job: &PrintJob, status: JobStatus, attempts: i32) {
    assert_eq!(job.status, status, "unexpected status for job {}", job.id);
    assert_eq!(job.attempts, attempts, "unexpected attempts for job {}", job.id);
}
