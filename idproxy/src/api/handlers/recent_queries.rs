use crate::{
    AppState,
    api::models::queries::{ClearQueriesResponse, QueryRecord, RecentQueriesQuery},
    errors::Error,
    openapi::ErrorResponse,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::info;

#[utoipa::path(
    get,
    path = "/api/recent-queries",
    tag = "query-history",
    summary = "List recent queries",
    description = "Return the most recent account status lookups, newest first.",
    params(RecentQueriesQuery),
    responses(
        (status = 200, description = "Recent queries, newest first", body = [QueryRecord]),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 500, description = "Query history unavailable", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_recent_queries(
    State(state): State<AppState>,
    query: Result<Query<RecentQueriesQuery>, QueryRejection>,
) -> Result<Json<Vec<QueryRecord>>, Error> {
    let Query(query) = query.map_err(|e| Error::BadRequest { message: e.body_text() })?;
    if let Some(limit) = query.limit
        && limit < 0
    {
        return Err(Error::BadRequest {
            message: "limit must be a non-negative integer".to_string(),
        });
    }

    let records = state.history.recent(query.limit_or(state.config.history.default_limit)).await?;
    Ok(Json(records))
}

#[utoipa::path(
    delete,
    path = "/api/recent-queries",
    tag = "query-history",
    summary = "Clear query history",
    responses(
        (status = 200, description = "History cleared", body = ClearQueriesResponse),
        (status = 500, description = "Query history unavailable", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn clear_recent_queries(State(state): State<AppState>) -> Result<Json<ClearQueriesResponse>, Error> {
    let removed = state.history.clear().await?;
    info!("Cleared {} query history records", removed);

    Ok(Json(ClearQueriesResponse {
        message: "Query history cleared".to_string(),
        removed,
    }))
}
