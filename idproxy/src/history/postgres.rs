//! PostgreSQL-backed query history.

use super::{NewQueryRecord, QueryHistory, Result};
use crate::api::models::queries::QueryRecord;
use crate::types::QueryId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct QueryHistoryRow {
    id: QueryId,
    phone_number: String,
    service_provider_id: String,
    request_id: Option<String>,
    consent_granted: bool,
    response_code: String,
    response_message: Option<String>,
    account_status: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<QueryHistoryRow> for QueryRecord {
    fn from(row: QueryHistoryRow) -> Self {
        Self {
            id: row.id,
            phone_number: row.phone_number,
            service_provider_id: row.service_provider_id,
            request_id: row.request_id,
            consent_granted: row.consent_granted,
            response_code: row.response_code,
            response_message: row.response_message,
            account_status: row.account_status,
            timestamp: row.created_at,
        }
    }
}

/// Query history stored in the `query_history` table.
#[derive(Debug, Clone)]
pub struct PostgresQueryHistory {
    pool: PgPool,
}

impl PostgresQueryHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and apply pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        migrator().run(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Migrations for the `query_history` table
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

#[async_trait]
impl QueryHistory for PostgresQueryHistory {
    #[instrument(skip_all, err)]
    async fn append(&self, record: NewQueryRecord) -> Result<QueryRecord> {
        let row = sqlx::query_as::<_, QueryHistoryRow>(
            "INSERT INTO query_history
                (id, phone_number, service_provider_id, request_id, consent_granted,
                 response_code, response_message, account_status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, phone_number, service_provider_id, request_id, consent_granted,
                       response_code, response_message, account_status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&record.phone_number)
        .bind(&record.service_provider_id)
        .bind(&record.request_id)
        .bind(record.consent_granted)
        .bind(&record.response_code)
        .bind(&record.response_message)
        .bind(&record.account_status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, QueryHistoryRow>(
            "SELECT id, phone_number, service_provider_id, request_id, consent_granted,
                    response_code, response_message, account_status, created_at
             FROM query_history
             ORDER BY created_at DESC, seq DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM query_history").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
