use gateway_service::config::Config;
use gateway_service::routes::{self, AppState};
use gateway_service::services::credential_service::FixedUserValidator;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Token Gateway");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    match &config.email {
        Some(email) => info!(from = %email.from_email, "Email notifications enabled"),
        None => info!("Email notifications disabled (provider not fully configured)"),
    }

    // Seed the credential store
    let credentials = FixedUserValidator::seeded(config.bcrypt_cost).map_err(|e| {
        error!("Failed to seed credential store: {}", e);
        e
    })?;

    info!("Credential store seeded");

    // Install the Prometheus recorder
    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        config,
        credentials: Arc::new(credentials),
    });

    // Build application routes
    let app = routes::build_routes(state, metrics_handle);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Token Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
