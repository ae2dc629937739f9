use crate::types::QueryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default number of records returned by the recent queries endpoint.
pub const DEFAULT_LIMIT: i64 = 10;

/// A past account status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    #[schema(value_type = String, format = "uuid")]
    pub id: QueryId,
    pub phone_number: String,
    pub service_provider_id: String,
    pub request_id: Option<String>,
    pub consent_granted: bool,
    /// Upstream response code as a string, or `"error"` when the upstream call failed
    pub response_code: String,
    pub response_message: Option<String>,
    pub account_status: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

/// Query parameters for listing recent queries
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RecentQueriesQuery {
    /// Maximum number of records to return, newest first (default: 10)
    #[param(default = 10, minimum = 0)]
    pub limit: Option<i64>,
}

impl RecentQueriesQuery {
    /// Returns the requested limit, or `default` when none was given.
    /// Negative limits are rejected by the handler before this is called.
    pub fn limit_or(&self, default: usize) -> usize {
        self.limit.map(|limit| limit.max(0) as usize).unwrap_or(default)
    }
}

/// Confirmation returned after clearing the history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearQueriesResponse {
    pub message: String,
    /// Number of records removed
    pub removed: u64,
}
