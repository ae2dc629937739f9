//! Client for the external identity-verification service.
//!
//! The [`AccountStatusClient`] trait is the seam between the endpoint layer and
//! the network: handlers only see a normalized [`AccountStatus`] or an
//! [`UpstreamError`], and tests substitute the upstream with a mock server.

mod client;

pub use client::HttpAccountStatusClient;

use crate::api::models::account_status::{AccountStatusRequest, RESPONSE_CODE_FOUND, RESPONSE_CODE_NOT_FOUND};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Status reported for found subscribers when the upstream omits one.
pub const STATUS_ACTIVE: &str = "ACTIVE";
/// Status reported for unknown subscribers when the upstream omits one.
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure, including a stall or disconnect while reading the body
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The upstream answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream answered 2xx but the body was not the expected JSON
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Whether a single retry is allowed for this failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, UpstreamError::Transport(_))
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Decode(_) => "decode",
        }
    }
}

/// Basic Auth credentials for the upstream.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body sent to the upstream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRequest<'a> {
    pub phone_number: &'a str,
    pub service_provider_id: &'a str,
    pub consent_granted: bool,
    pub request_id: &'a str,
}

impl<'a> UpstreamRequest<'a> {
    pub fn new(request: &'a AccountStatusRequest, request_id: &'a str) -> Self {
        Self {
            phone_number: &request.phone_number,
            service_provider_id: &request.service_provider_id,
            consent_granted: request.consent_granted,
            request_id,
        }
    }
}

/// Raw upstream response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamResponse {
    pub response_code: i64,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub subscriber: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Normalized upstream result.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatus {
    pub response_code: i64,
    pub response_message: Option<String>,
    pub account_status: Option<String>,
    pub subscriber: Option<serde_json::Value>,
    /// Any further fields the upstream returned
    pub extra: HashMap<String, serde_json::Value>,
}

impl AccountStatus {
    pub fn is_found(&self) -> bool {
        self.response_code == RESPONSE_CODE_FOUND
    }
}

impl From<UpstreamResponse> for AccountStatus {
    fn from(response: UpstreamResponse) -> Self {
        let (account_status, response_message) = match response.response_code {
            RESPONSE_CODE_FOUND => (
                response.account_status.or_else(|| Some(STATUS_ACTIVE.to_string())),
                response.response_message,
            ),
            RESPONSE_CODE_NOT_FOUND => (
                response.account_status.or_else(|| Some(STATUS_NOT_FOUND.to_string())),
                response.response_message.or_else(|| Some("Subscriber not found".to_string())),
            ),
            _ => (response.account_status, response.response_message),
        };

        Self {
            response_code: response.response_code,
            response_message,
            account_status,
            subscriber: response.subscriber,
            extra: response.extra,
        }
    }
}

/// Looks up the account status of a phone number.
#[async_trait]
pub trait AccountStatusClient: Send + Sync {
    async fn account_status(
        &self,
        request: &AccountStatusRequest,
        credentials: &Credentials,
        request_id: &str,
    ) -> Result<AccountStatus, UpstreamError>;
}
