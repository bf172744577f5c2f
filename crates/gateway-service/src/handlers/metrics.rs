//! Prometheus metrics endpoint handler.
//!
//! # Security
//!
//! This endpoint is unauthenticated to allow Prometheus to scrape
//! metrics. No PII or secrets are exposed; only operational counters
//! with bounded cardinality labels.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns Prometheus-formatted metrics for scraping.
#[tracing::instrument(skip_all, name = "gateway.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

#[cfg(test)]
mod tests {
    // Testing this endpoint requires a PrometheusHandle, which can only
    // be installed once per process. Integration tests exercise the full
    // endpoint via the spawned server harness.
}
