//! Health check endpoint.

/// Handler for GET /health
///
/// Liveness only; the gateway is stateless so there is nothing deeper to
/// probe.
pub async fn health_check() -> &'static str {
    "OK"
}
