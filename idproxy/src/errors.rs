use crate::history::HistoryError;
use crate::upstream::UpstreamError;
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request body failed schema validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed query parameters or an unreadable request body
    #[error("{message}")]
    BadRequest { message: String },

    /// Required server-side configuration (e.g. upstream credentials) is missing
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The identity-verification service could not be reached or answered badly
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),

    /// Query history store failure
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::History(_) | Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking upstream or internal details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(err) => err.to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Configuration { .. } => "Service is not configured to reach the identity verification provider".to_string(),
            Error::UpstreamUnavailable(_) => "Identity verification service is unavailable".to_string(),
            Error::History(_) => "Query history is unavailable".to_string(),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Configuration { .. } | Error::History(_) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::UpstreamUnavailable(_) => {
                tracing::warn!("Upstream error: {}", self);
            }
            Error::Validation(_) | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({ "message": self.user_message() });
        (status, axum::response::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let validation: Error = ValidationError::InvalidPhoneNumber.into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let config = Error::Configuration {
            message: "missing username".to_string(),
        };
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let upstream: Error = UpstreamError::Status {
            status: 503,
            body: "down".to_string(),
        }
        .into();
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);

        let other: Error = anyhow::anyhow!("boom").into();
        assert_eq!(other.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_user_message_hides_upstream_details() {
        let err: Error = UpstreamError::Status {
            status: 500,
            body: "stack trace from upstream".to_string(),
        }
        .into();
        let message = err.user_message();
        assert_eq!(message, "Identity verification service is unavailable");
        assert!(!message.contains("stack trace"));
    }

    #[test]
    fn test_user_message_hides_configuration_details() {
        let err = Error::Configuration {
            message: "ENSTREAM_PASSWORD is not set".to_string(),
        };
        assert!(!err.user_message().contains("ENSTREAM_PASSWORD"));
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err: Error = ValidationError::InvalidPhoneNumber.into();
        assert!(err.user_message().contains("E.164"));
    }
}
