//! HTTP routes for the token gateway.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::auth::require_bearer;
use crate::services::credential_service::CredentialValidator;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Credential store consulted by /login.
    pub credentials: Arc<dyn CredentialValidator>,
}

/// Install the global Prometheus recorder and return its handle.
///
/// # Errors
///
/// Fails if a recorder is already installed in this process; callers in
/// tests fall back to a standalone recorder.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Build the application routes.
///
/// - `GET /` - protected, echoes the authenticated subject
/// - `POST /login` - credential login, issues a token pair
/// - `POST /oauth/access_token` - refresh token redemption
/// - `GET /health` - liveness check
/// - `GET /metrics` - Prometheus scrape endpoint
///
/// TraceLayer logs every request; a 30 second timeout bounds them all.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // Protected routes: bearer guard runs before the handler
    let protected_routes = Router::new()
        .route("/", get(handlers::home::home))
        .route_layer(from_fn_with_state(state.clone(), require_bearer))
        .with_state(state.clone());

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/login", post(handlers::auth_handler::handle_login))
        .route(
            "/oauth/access_token",
            post(handlers::auth_handler::handle_refresh),
        )
        .route("/health", get(handlers::health::health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .with_state(metrics_handle);

    protected_routes
        .merge(public_routes)
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
