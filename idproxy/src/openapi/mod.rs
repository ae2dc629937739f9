//! OpenAPI documentation for the account status API.
//!
//! The generated document is served at `/api-docs/openapi.json` and rendered
//! with Scalar at `/docs`.

use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::api;

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "message": "phoneNumber must be in E.164 format, e.g. +12040000065" }))]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "idproxy",
        description = "Account status lookups against an external identity-verification service, \
            with a short history of recent queries."
    ),
    paths(
        api::handlers::account_status::check_account_status,
        api::handlers::recent_queries::list_recent_queries,
        api::handlers::recent_queries::clear_recent_queries,
    ),
    components(
        schemas(
            api::models::account_status::AccountStatusRequest,
            api::models::account_status::AccountStatusResponse,
            api::models::queries::QueryRecord,
            api::models::queries::ClearQueriesResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "account-status", description = "Phone number account status lookups"),
        (name = "query-history", description = "Recent lookups kept by this service"),
    )
)]
pub struct ApiDoc;
