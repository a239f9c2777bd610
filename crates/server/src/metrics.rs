//! Prometheus metrics

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::ServerError;

pub const REQUESTS_TOTAL: &str = "site_assistant_requests_total";
pub const REQUEST_DURATION: &str = "site_assistant_request_duration_seconds";

static RECORDER: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder, once per process
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    RECORDER
        .get_or_try_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| ServerError::Internal(format!("metrics recorder: {}", e)))
        })
        .cloned()
}

pub fn record_request(endpoint: &str, status: StatusCode, elapsed: Duration) {
    let endpoint = endpoint.to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "endpoint" => endpoint.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION, "endpoint" => endpoint).record(elapsed.as_secs_f64());
}

/// Middleware recording count and latency per matched route
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;
    record_request(&endpoint, response.status(), started.elapsed());
    response
}
