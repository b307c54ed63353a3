use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use brandpulse_common::{RequestRecord, RequestStatus};
use brandpulse_core::RequestLedger;

/// `RequestLedger` backed by the `brand_analysis_requests` table.
///
/// The core inserts `pending` rows and reads; status transitions are
/// written by the backend through its own connection.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    user_id: String,
    session_id: String,
    question: String,
    brand: String,
    location: String,
    category: String,
    status: String,
    results: Option<serde_json::Value>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_record(self) -> Result<RequestRecord> {
        let Some(status) = RequestStatus::parse(&self.status) else {
            bail!("unknown request status in ledger: {}", self.status);
        };
        Ok(RequestRecord {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            question: self.question,
            brand: self.brand,
            location: self.location,
            category: self.category,
            status,
            results: self.results,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const COLUMNS: &str = "id, user_id, session_id, question, brand, location, category, \
                       status, results, error_message, created_at, updated_at";

#[async_trait]
impl RequestLedger for PgLedger {
    async fn insert(&self, record: &RequestRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO brand_analysis_requests
                (id, user_id, session_id, question, brand, location, category,
                 status, results, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(&record.user_id)
        .bind(&record.session_id)
        .bind(&record.question)
        .bind(&record.brand)
        .bind(&record.location)
        .bind(&record.category)
        .bind(record.status.as_str())
        .bind(&record.results)
        .bind(&record.error_message)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_identity(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<RequestRecord>> {
        let row = sqlx::query_as::<_, LedgerRow>(&format!(
            "SELECT {COLUMNS} FROM brand_analysis_requests
             WHERE user_id = $1 AND session_id = $2
             ORDER BY updated_at DESC, created_at DESC
             LIMIT 1"
        ))
        .bind(user_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LedgerRow::into_record).transpose()
    }

    async fn find_latest_by_question(&self, question: &str) -> Result<Option<RequestRecord>> {
        let row = sqlx::query_as::<_, LedgerRow>(&format!(
            "SELECT {COLUMNS} FROM brand_analysis_requests
             WHERE question = $1
             ORDER BY updated_at DESC, created_at DESC
             LIMIT 1"
        ))
        .bind(question)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LedgerRow::into_record).transpose()
    }

    async fn delete_stale_failed(&self, retention_secs: i64) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::seconds(retention_secs);
        let result = sqlx::query(
            "DELETE FROM brand_analysis_requests
             WHERE status = 'failed' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
