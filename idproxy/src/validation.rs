//! Schema validation for inbound account status requests.
//!
//! The payload arrives as untyped JSON so that every violation can be reported
//! with a field-level message. Fields are checked in a fixed order and the first
//! violation wins.

use crate::api::models::account_status::AccountStatusRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// E.164: a `+`, a non-zero leading digit, and at most 15 digits in total.
/// ASCII digits only; `\d` would also accept other Unicode digit classes.
static E164: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("E.164 pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a {expected}")]
    WrongType { field: &'static str, expected: &'static str },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("phoneNumber must be in E.164 format, e.g. +12040000065")]
    InvalidPhoneNumber,
}

/// Returns true if `phone_number` is a well-formed E.164 number.
pub fn is_e164(phone_number: &str) -> bool {
    E164.is_match(phone_number)
}

/// Validate an untyped request payload.
///
/// `default_service_provider_id` is used when the client leaves `serviceProviderId`
/// out (or sends `null`).
pub fn validate_account_status_request(
    payload: &Value,
    default_service_provider_id: &str,
) -> Result<AccountStatusRequest, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let phone_number = match optional_string(object, "phoneNumber")? {
        Some(phone) if is_e164(phone) => phone.to_string(),
        Some(_) => return Err(ValidationError::InvalidPhoneNumber),
        None => return Err(ValidationError::MissingField { field: "phoneNumber" }),
    };

    let service_provider_id = match optional_string(object, "serviceProviderId")? {
        Some(id) if id.trim().is_empty() => {
            return Err(ValidationError::EmptyField {
                field: "serviceProviderId",
            });
        }
        Some(id) => id.to_string(),
        None => default_service_provider_id.to_string(),
    };

    let request_id = match optional_string(object, "requestId")? {
        Some(id) if id.trim().is_empty() => return Err(ValidationError::EmptyField { field: "requestId" }),
        other => other.map(str::to_string),
    };

    let consent_granted = match object.get("consentGranted") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(consent)) => *consent,
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: "consentGranted",
                expected: "boolean",
            });
        }
    };

    Ok(AccountStatusRequest {
        phone_number,
        service_provider_id,
        request_id,
        consent_granted,
    })
}

/// `null` and absent are treated alike.
fn optional_string<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<Option<&'a str>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT_PROVIDER: &str = "8349570948";

    #[test]
    fn test_accepts_valid_e164_numbers() {
        for phone in ["+12040000065", "+44", "+447911123456", "+999999999999999", "+10"] {
            assert!(is_e164(phone), "{phone} should be accepted");
        }
    }

    #[test]
    fn test_rejects_invalid_e164_numbers() {
        for phone in [
            "12040000065",
            "+",
            "+1",
            "+0123456789",
            "+1234567890123456",
            "+1 204 000 0065",
            "+1-204-000-0065",
            " +12040000065",
            "+12040000065\n",
            "+١٢٣٤",
            "",
        ] {
            assert!(!is_e164(phone), "{phone:?} should be rejected");
        }
    }

    #[test]
    fn test_full_request_is_validated() {
        let payload = json!({
            "phoneNumber": "+12040000065",
            "serviceProviderId": "1111",
            "requestId": "req-42",
            "consentGranted": false
        });

        let request = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap();
        assert_eq!(request.phone_number, "+12040000065");
        assert_eq!(request.service_provider_id, "1111");
        assert_eq!(request.request_id.as_deref(), Some("req-42"));
        assert!(!request.consent_granted);
    }

    #[test]
    fn test_defaults_are_applied() {
        let payload = json!({ "phoneNumber": "+12040000065", "requestId": null });

        let request = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap();
        assert_eq!(request.service_provider_id, DEFAULT_PROVIDER);
        assert_eq!(request.request_id, None);
        assert!(request.consent_granted);
    }

    #[test]
    fn test_missing_plus_is_a_phone_format_error() {
        let payload = json!({
            "phoneNumber": "12040000065",
            "serviceProviderId": DEFAULT_PROVIDER,
            "consentGranted": true
        });

        let err = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err();
        assert_eq!(err, ValidationError::InvalidPhoneNumber);
        assert!(err.to_string().contains("E.164"));
    }

    #[test]
    fn test_first_violation_is_reported() {
        let payload = json!({ "serviceProviderId": "", "consentGranted": "yes" });
        let err = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "phoneNumber" });

        let payload = json!({ "phoneNumber": "+12040000065", "serviceProviderId": "  ", "consentGranted": "yes" });
        let err = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyField {
                field: "serviceProviderId"
            }
        );
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let payload = json!({ "phoneNumber": 12040000065u64 });
        let err = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "phoneNumber must be a string");

        let payload = json!({ "phoneNumber": "+12040000065", "consentGranted": "true" });
        let err = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "consentGranted must be a boolean");

        let payload = json!({ "phoneNumber": "+12040000065", "requestId": "" });
        let err = validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err();
        assert_eq!(err, ValidationError::EmptyField { field: "requestId" });
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        for payload in [json!(null), json!([]), json!("+12040000065")] {
            assert_eq!(
                validate_account_status_request(&payload, DEFAULT_PROVIDER).unwrap_err(),
                ValidationError::NotAnObject
            );
        }
    }
}
