//! reqwest-based upstream client.

use super::{AccountStatus, AccountStatusClient, Credentials, UpstreamError, UpstreamRequest, UpstreamResponse};
use crate::api::models::account_status::AccountStatusRequest;
use crate::config::UpstreamConfig;
use crate::types::mask_phone_number;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Upper bound on how much of an error body is kept for logs.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Calls the upstream account status endpoint over HTTP with Basic Auth.
///
/// Every attempt is bounded by the configured timeout. A transport failure
/// (connect error, timeout) is retried once when enabled; HTTP status and body
/// failures are returned immediately.
#[derive(Debug, Clone)]
pub struct HttpAccountStatusClient {
    client: Client,
    endpoint: Url,
    retry_on_transport_error: bool,
}

impl HttpAccountStatusClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint()?,
            retry_on_transport_error: config.retry_on_transport_error,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send_once(
        &self,
        body: &UpstreamRequest<'_>,
        credentials: &Credentials,
        request_id: &str,
    ) -> Result<AccountStatus, UpstreamError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header("X-Request-Id", request_id)
            .json(body)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        // Stalls and disconnects mid-body count as transport failures
        let bytes = response.bytes().await.map_err(UpstreamError::Transport)?;

        if !status.is_success() {
            let body: String = String::from_utf8_lossy(&bytes).chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UpstreamResponse = serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl AccountStatusClient for HttpAccountStatusClient {
    #[instrument(skip_all, fields(request_id = %request_id, phone = %mask_phone_number(&request.phone_number)))]
    async fn account_status(
        &self,
        request: &AccountStatusRequest,
        credentials: &Credentials,
        request_id: &str,
    ) -> Result<AccountStatus, UpstreamError> {
        let body = UpstreamRequest::new(request, request_id);
        let max_attempts = if self.retry_on_transport_error { 2 } else { 1 };
        let start = Instant::now();

        let mut attempt = 1;
        let result = loop {
            match self.send_once(&body, credentials, request_id).await {
                Err(e) if e.is_transport() && attempt < max_attempts => {
                    warn!("Upstream attempt {} failed, retrying once: {}", attempt, e);
                    attempt += 1;
                }
                other => break other,
            }
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::counter!("idproxy_upstream_requests_total", "outcome" => outcome).increment(1);
        debug!(
            "Upstream call finished: outcome={}, attempts={}, elapsed_ms={}",
            outcome,
            attempt,
            start.elapsed().as_millis()
        );

        result
    }
}
