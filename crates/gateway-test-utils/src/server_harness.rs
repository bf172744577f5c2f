//! Test server harness for E2E testing
//!
//! Provides TestGateway for spawning real gateway server instances in
//! tests.

use crate::crypto_fixtures::{test_config, TEST_BCRYPT_COST};
use gateway_service::config::Config;
use gateway_service::routes::{self, AppState};
use gateway_service::services::credential_service::FixedUserValidator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Default key seed used by [`TestGateway::spawn`].
pub const DEFAULT_KEY_SEED: u8 = 1;

/// Test harness for spawning the gateway in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> anyhow::Result<()> {
///     let server = TestGateway::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/login", server.url()))
///         .json(&serde_json::json!({"username": "sherlock", "password": "password"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestGateway {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Spawn a gateway with the default sherlock/watson users and key
    /// seed.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_seed(DEFAULT_KEY_SEED).await
    }

    /// Spawn a gateway signing with the key derived from `seed`.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Seed the default user set at the test bcrypt cost
    /// - Start the HTTP server in the background
    pub async fn spawn_with_seed(seed: u8) -> Result<Self, anyhow::Error> {
        let config = test_config(seed);

        let credentials = FixedUserValidator::seeded(TEST_BCRYPT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to seed credential store: {e}"))?;

        let state = Arc::new(AppState {
            config: config.clone(),
            credentials: Arc::new(credentials),
        });

        // Initialize metrics recorder for the test server. Installation
        // can only happen once per process; later servers fall back to a
        // standalone recorder so each test still gets a handle.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {e}"))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {e}"))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {e}");
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The HS256 key this server signs and verifies with
    pub fn signing_key(&self) -> &[u8] {
        &self.config.signing_key
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released as soon as
        // the test completes.
        self._handle.abort();
    }
}
