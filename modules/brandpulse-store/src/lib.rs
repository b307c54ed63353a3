//! Postgres implementations of the ledger and result-cache contracts.

pub mod cache;
pub mod ledger;

pub use cache::PgResultCache;
pub use ledger::PgLedger;

use anyhow::Result;
use sqlx::PgPool;

/// Create the tables this crate needs. Idempotent; called at boot.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS brand_analysis_requests (
            id            UUID         PRIMARY KEY,
            user_id       TEXT         NOT NULL,
            session_id    TEXT         NOT NULL,
            question      TEXT         NOT NULL,
            brand         TEXT         NOT NULL,
            location      TEXT         NOT NULL,
            category      TEXT         NOT NULL,
            status        TEXT         NOT NULL DEFAULT 'pending',
            results       JSONB,
            error_message TEXT,
            created_at    TIMESTAMPTZ  NOT NULL DEFAULT now(),
            updated_at    TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS brand_analysis_requests_identity
         ON brand_analysis_requests (user_id, session_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS brand_analysis_requests_question
         ON brand_analysis_requests (question, updated_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_cache (
            cache_key  TEXT         PRIMARY KEY,
            payload    JSONB        NOT NULL,
            created_at TIMESTAMPTZ  NOT NULL DEFAULT now(),
            expires_at TIMESTAMPTZ  NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
