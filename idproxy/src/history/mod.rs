//! Query history storage.
//!
//! Every account status lookup that reaches the upstream leaves one
//! [`QueryRecord`] behind. Records are immutable once stored and can only be
//! removed all at once via [`QueryHistory::clear`].
//!
//! Two implementations are provided:
//!
//! - [`InMemoryQueryHistory`]: the default, process-local store
//! - [`PostgresQueryHistory`]: durable storage in the `query_history` table
//!
//! Both assign the identifier and creation timestamp on [`QueryHistory::append`];
//! callers never choose them.

mod memory;
mod postgres;

pub use memory::InMemoryQueryHistory;
pub use postgres::PostgresQueryHistory;

use crate::api::models::account_status::AccountStatusRequest;
use crate::api::models::queries::QueryRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Response code stored for lookups where the upstream could not be reached.
pub const UPSTREAM_ERROR_CODE: &str = "error";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("query history database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query history migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// A query record before it has been stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueryRecord {
    pub phone_number: String,
    pub service_provider_id: String,
    pub request_id: Option<String>,
    pub consent_granted: bool,
    pub response_code: String,
    pub response_message: Option<String>,
    pub account_status: Option<String>,
}

impl NewQueryRecord {
    /// Record for a lookup the upstream answered.
    pub fn answered(
        request: &AccountStatusRequest,
        request_id: &str,
        response_code: i64,
        response_message: Option<String>,
        account_status: Option<String>,
    ) -> Self {
        Self {
            phone_number: request.phone_number.clone(),
            service_provider_id: request.service_provider_id.clone(),
            request_id: Some(request_id.to_string()),
            consent_granted: request.consent_granted,
            response_code: response_code.to_string(),
            response_message,
            account_status,
        }
    }

    /// Record for a lookup where the upstream call failed.
    pub fn failed(request: &AccountStatusRequest, request_id: &str, message: impl Into<String>) -> Self {
        Self {
            phone_number: request.phone_number.clone(),
            service_provider_id: request.service_provider_id.clone(),
            request_id: Some(request_id.to_string()),
            consent_granted: request.consent_granted,
            response_code: UPSTREAM_ERROR_CODE.to_string(),
            response_message: Some(message.into()),
            account_status: None,
        }
    }
}

/// Ordered store of past queries.
#[async_trait]
pub trait QueryHistory: Send + Sync {
    /// Store a record, assigning it a fresh identifier and creation timestamp.
    async fn append(&self, record: NewQueryRecord) -> Result<QueryRecord>;

    /// Up to `limit` most recently created records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>>;

    /// Remove every record, returning how many were removed.
    async fn clear(&self) -> Result<u64>;
}
