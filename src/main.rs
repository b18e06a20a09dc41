use std::sync::Arc;

use axum::Router;
use tokio::sync::Notify;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use label_print_queue::{
    app_state::AppState,
    config::AppConfig,
    db::{self, PgJobStore},
    routes,
    services::{printer::TsplPrinter, worker_pool::Dispatcher},
    telemetry,
};

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");
    let settings = config.queue_settings();

    tracing::info!("Initializing label-print-queue server");

    let prometheus_handle = telemetry::init_metrics().expect("Failed to install Prometheus metrics recorder");

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url, settings.worker_count as u32 + 5)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let store = Arc::new(PgJobStore::new(db_pool, settings.max_job_attempts));
    let printer = Arc::new(TsplPrinter::new(&config.printer_addr, config.printer_timeout()));
    let wakeup = Arc::new(Notify::new());

    let dispatcher = config.embedded_workers.then(|| {
        Dispatcher::spawn(store.clone(), printer.clone(), &settings, wakeup.clone())
    });

    let state = AppState::new(store, printer, config.intake_limits(), wakeup);

    let app = Router::new()
        .merge(routes::router(state))
        .merge(routes::metrics::router(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Some(dispatcher) = dispatcher {
        dispatcher.shutdown().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
