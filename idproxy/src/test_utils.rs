//! Shared helpers for handler and router tests.

use crate::config::{Config, UpstreamConfig};
use crate::history::InMemoryQueryHistory;
use crate::upstream::HttpAccountStatusClient;
use crate::{AppState, build_router};
use axum_test::TestServer;
use std::sync::{Arc, Once};
use std::time::Duration;

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest is built without a bundled provider, so tests install one like `main` does.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// Config pointing at `upstream_url` with test credentials and a short timeout.
pub fn create_test_config(upstream_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream: UpstreamConfig {
            base_url: upstream_url.parse().expect("test upstream URL should parse"),
            timeout: Duration::from_secs(2),
            username: Some("qa-user".to_string()),
            password: Some("qa-pass".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Router over an in-memory history. The history handle is returned so tests can
/// seed and inspect it directly.
pub fn create_test_server(config: Config) -> (TestServer, InMemoryQueryHistory) {
    install_crypto_provider();

    let history = InMemoryQueryHistory::default();
    let upstream = HttpAccountStatusClient::new(&config.upstream).expect("Failed to create upstream client");
    let state = AppState::builder()
        .config(config)
        .history(Arc::new(history.clone()))
        .upstream(Arc::new(upstream))
        .build();

    let router = build_router(state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, history)
}
