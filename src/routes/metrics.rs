use axum::extract::State;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

/// Prometheus scrape route. Carries its own state, merge it into the app router.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(handle)
}

/// Returns metrics in Prometheus text exposition format.
async fn prometheus_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
