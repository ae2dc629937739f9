//! API request and response data models.
//!
//! - [`account_status`]: the account status lookup request and its normalized response
//! - [`queries`]: query history records and the recent-queries query parameters
//!
//! All models are annotated with `utoipa` for the generated OpenAPI document and
//! serialize with camelCase field names.

pub mod account_status;
pub mod queries;
