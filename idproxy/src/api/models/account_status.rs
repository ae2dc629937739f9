use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Upstream response code meaning the subscriber was found.
pub const RESPONSE_CODE_FOUND: i64 = 0;
/// Upstream response code meaning the subscriber was not found.
pub const RESPONSE_CODE_NOT_FOUND: i64 = 1;

/// A validated account status request.
///
/// Built by [`crate::validation::validate_account_status_request`]; the raw body is
/// accepted as untyped JSON so that violations can be reported per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusRequest {
    /// Phone number in E.164 format
    #[schema(example = "+12040000065", pattern = r"^\+[1-9][0-9]{1,14}$")]
    pub phone_number: String,
    /// Service provider identifier; the configured default is used when omitted
    #[schema(example = "8349570948", required = false)]
    pub service_provider_id: String,
    /// Caller-supplied request identifier; a UUID is generated when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Whether the subscriber consented to the lookup
    #[schema(default = true, required = false)]
    pub consent_granted: bool,
}

/// Normalized account status returned to the caller.
///
/// Fields the upstream returns beyond the well-known ones are passed through
/// unchanged at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusResponse {
    /// 0 = found, 1 = not found, anything else is an upstream error or special condition
    pub response_code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_status: Option<String>,
    /// Subscriber attributes, when the upstream provides them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<serde_json::Value>,
    /// Echo of the requested phone number
    pub phone_number: String,
    /// Request identifier sent upstream
    pub request_id: String,
    /// Time the response was produced
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub upstream_fields: HashMap<String, serde_json::Value>,
}
