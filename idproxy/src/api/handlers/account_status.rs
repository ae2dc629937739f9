//! HTTP handler for account status lookups.

use crate::{
    AppState,
    api::models::account_status::{AccountStatusRequest, AccountStatusResponse},
    errors::Error,
    history::NewQueryRecord,
    openapi::ErrorResponse,
    types::{abbrev_uuid, mask_phone_number},
    upstream::AccountStatus,
    validation::validate_account_status_request,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upstream fields that would collide with the ones this service sets itself.
const RESERVED_FIELDS: [&str; 3] = ["phoneNumber", "requestId", "timestamp"];

#[utoipa::path(
    post,
    path = "/api/account-status",
    tag = "account-status",
    summary = "Check account status",
    description = "Validate the request, forward it to the identity-verification service and record the \
        outcome in the query history. Response code 0 means the subscriber was found, 1 means not found.",
    request_body = AccountStatusRequest,
    responses(
        (status = 200, description = "Upstream answered", body = AccountStatusResponse),
        (status = 400, description = "Invalid request, e.g. a phone number not in E.164 format", body = ErrorResponse),
        (status = 500, description = "Upstream credentials are not configured", body = ErrorResponse),
        (status = 502, description = "Identity-verification service unavailable", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn check_account_status(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AccountStatusResponse>, Error> {
    let Json(payload) = payload.map_err(|e| Error::BadRequest { message: e.body_text() })?;
    let request = validate_account_status_request(&payload, &state.config.default_service_provider_id)?;
    let credentials = state.config.upstream.credentials()?;
    let request_id = request.request_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

    info!(
        "Checking account status: phone={}, provider={}, request_id={}",
        mask_phone_number(&request.phone_number),
        request.service_provider_id,
        request_id
    );

    match state.upstream.account_status(&request, &credentials, &request_id).await {
        Ok(status) => {
            record(
                &state,
                NewQueryRecord::answered(
                    &request,
                    &request_id,
                    status.response_code,
                    status.response_message.clone(),
                    status.account_status.clone(),
                ),
            )
            .await;
            Ok(Json(build_response(status, request.phone_number, request_id)))
        }
        Err(e) => {
            let err = Error::UpstreamUnavailable(e);
            record(&state, NewQueryRecord::failed(&request, &request_id, err.user_message())).await;
            Err(err)
        }
    }
}

/// History write failures are logged and do not fail the lookup.
async fn record(state: &AppState, record: NewQueryRecord) {
    match state.history.append(record).await {
        Ok(stored) => debug!("Recorded query {}", abbrev_uuid(&stored.id)),
        Err(e) => warn!("Failed to record query history: {}", e),
    }
}

fn build_response(status: AccountStatus, phone_number: String, request_id: String) -> AccountStatusResponse {
    let mut upstream_fields = status.extra;
    for field in RESERVED_FIELDS {
        upstream_fields.remove(field);
    }

    AccountStatusResponse {
        response_code: status.response_code,
        response_message: status.response_message,
        account_status: status.account_status,
        subscriber: status.subscriber,
        phone_number,
        request_id,
        timestamp: Utc::now(),
        upstream_fields,
    }
}
