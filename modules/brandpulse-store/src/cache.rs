use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::PgPool;

use brandpulse_core::ResultCache;

/// `ResultCache` backed by the `analysis_cache` table. Expiry is lazy on
/// read; the sweep loop reclaims rows with `evict_expired`.
#[derive(Clone)]
pub struct PgResultCache {
    pool: PgPool,
}

impl PgResultCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultCache for PgResultCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query_as::<_, (Value,)>(
            "SELECT payload FROM analysis_cache
             WHERE cache_key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn set(&self, key: &str, value: &Value, ttl_secs: i64) -> Result<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_secs);
        sqlx::query(
            "INSERT INTO analysis_cache (cache_key, payload, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (cache_key)
             DO UPDATE SET payload = EXCLUDED.payload,
                           expires_at = EXCLUDED.expires_at,
                           created_at = now()",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM analysis_cache WHERE cache_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn evict_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM analysis_cache WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
