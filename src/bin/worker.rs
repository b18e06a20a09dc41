use std::sync::Arc;

use label_print_queue::{
    config::AppConfig,
    db::{self, PgJobStore},
    services::{printer::TsplPrinter, worker_pool::Dispatcher},
    telemetry,
};
use tokio::sync::Notify;

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    tracing::info!("Starting headless print worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration");
    let settings = config.queue_settings();

    // Metrics are recorded but not served without the HTTP process
    if let Err(e) = telemetry::init_metrics() {
        tracing::warn!(error = %e, "Metrics recorder not installed");
    }

    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url, settings.worker_count as u32 + 2)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let store = Arc::new(PgJobStore::new(db_pool, settings.max_job_attempts));
    let printer = Arc::new(TsplPrinter::new(&config.printer_addr, config.printer_timeout()));

    // Inserts happen in another process, so workers rely on polling alone
    let dispatcher = Dispatcher::spawn(store, printer, &settings, Arc::new(Notify::new()));

    tracing::info!(printer = %config.printer_addr, "Worker ready, processing jobs");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    dispatcher.shutdown().await;
}
