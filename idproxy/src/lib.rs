//! # idproxy: account status proxy for an identity-verification API
//!
//! `idproxy` sits between a browser UI and an external identity-verification
//! service. It accepts account status lookups for E.164 phone numbers, validates
//! them, forwards them to the upstream with Basic Auth credentials that never
//! leave the server, and keeps a short history of recent lookups that the UI can
//! list and clear.
//!
//! ## Request Flow
//!
//! A `POST /api/account-status` request is handled in four steps:
//!
//! 1. The JSON body is validated ([`validation`]); invalid requests get a 400 and
//!    are never forwarded or recorded.
//! 2. Upstream credentials are resolved from configuration; missing credentials
//!    are a server-side fault (500).
//! 3. The request is sent upstream ([`upstream`]) and the answer is normalized.
//!    Unreachable or misbehaving upstreams map to 502.
//! 4. The outcome, including upstream failures, is appended to the query history
//!    ([`history`]) and returned to the caller.
//!
//! ## Configuration
//!
//! Configuration is loaded from a YAML file (default `config.yaml`) and
//! `IDPROXY_`-prefixed environment variables, see [`config`]. Upstream
//! credentials are normally supplied through `ENSTREAM_QA_USER`/`ENSTREAM_QA_PASS`
//! or `ENSTREAM_USERNAME`/`ENSTREAM_PASSWORD`.
//!
//! ## Observability
//!
//! Logging uses `tracing` with `RUST_LOG` filtering and optional OTLP export
//! ([`telemetry`]). Prometheus metrics are served at `/internal/metrics` when
//! `enable_metrics` is set.

pub mod api;
pub mod config;
pub mod errors;
pub mod history;
mod openapi;
pub mod telemetry;
pub mod types;
pub mod upstream;
pub mod validation;

#[cfg(test)]
mod test_utils;

use crate::{
    api::handlers::{account_status, recent_queries},
    config::{CorsOrigin, HistoryBackend},
    history::{InMemoryQueryHistory, PostgresQueryHistory, QueryHistory},
    openapi::ApiDoc,
    upstream::{AccountStatusClient, HttpAccountStatusClient},
};
use axum::{
    Json, Router,
    http::{self, HeaderValue, Method},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .history(Arc::new(InMemoryQueryHistory::default()))
///     .upstream(Arc::new(HttpAccountStatusClient::new(&config.upstream)?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub history: Arc<dyn QueryHistory>,
    pub upstream: Arc<dyn AccountStatusClient>,
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.cors;

    // tower-http rejects "*" inside an origin list
    let allow_origin = if cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE]);

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(layer)
}

/// Build the application router with all endpoints and middleware.
///
/// - `/api/*`: account status lookups and the query history
/// - `/healthz`: liveness probe
/// - `/api-docs/openapi.json` and `/docs`: OpenAPI document and its Scalar UI
/// - `/internal/metrics`: Prometheus metrics, when enabled
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/account-status", post(account_status::check_account_status))
        .route(
            "/recent-queries",
            get(recent_queries::list_recent_queries).delete(recent_queries::clear_recent_queries),
        );

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Open the configured query history store.
async fn setup_history(config: &Config) -> anyhow::Result<(Arc<dyn QueryHistory>, Option<PgPool>)> {
    match config.history.backend {
        HistoryBackend::Memory => {
            info!("Query history is kept in memory and will be lost on restart");
            Ok((Arc::new(InMemoryQueryHistory::default()), None))
        }
        HistoryBackend::Postgres => {
            let url = config
                .history
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("history.database_url is required for the postgres history backend"))?;
            let store = PostgresQueryHistory::connect(url, config.history.max_connections).await?;
            info!("Query history is stored in PostgreSQL");
            let pool = store.pool().clone();
            Ok((Arc::new(store), Some(pool)))
        }
    }
}

/// The assembled service: router plus the resources it owns.
///
/// 1. **Create**: [`Application::new`] opens the history store and builds the upstream client
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests drain and the
///    history pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting idproxy with configuration: {:#?}", config);

        let (history, pool) = setup_history(&config).await?;
        let upstream = HttpAccountStatusClient::new(&config.upstream)?;
        info!("Forwarding account status lookups to {}", upstream.endpoint());
        if config.upstream.credentials().is_err() {
            tracing::warn!("Upstream credentials are not configured; lookups will fail until they are set");
        }

        let state = AppState::builder()
            .config(config.clone())
            .history(history)
            .upstream(Arc::new(upstream))
            .build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "idproxy listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
