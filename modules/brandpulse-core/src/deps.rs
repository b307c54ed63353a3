use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use brandpulse_common::{RequestRecord, StatusSnapshot};

/// Key-value store for completed analysis payloads, TTL-bounded.
/// Single-key atomicity is the store's responsibility.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Look up a payload. Expired entries are misses.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a payload (upsert), expiring after `ttl_secs`.
    async fn set(&self, key: &str, value: &Value, ttl_secs: i64) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove expired entries. Returns the number removed.
    async fn evict_expired(&self) -> Result<u64>;
}

/// Durable record of every analysis attempt. The core creates rows and
/// reads them; status transitions are written externally by the backend.
#[async_trait]
pub trait RequestLedger: Send + Sync {
    async fn insert(&self, record: &RequestRecord) -> Result<()>;

    async fn find_by_identity(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<RequestRecord>>;

    /// Most recent record for a dedup question, any status, ordered by
    /// `updated_at` then `created_at` descending.
    async fn find_latest_by_question(&self, question: &str) -> Result<Option<RequestRecord>>;

    /// Delete failed rows older than the retention window. Returns the
    /// number removed.
    async fn delete_stale_failed(&self, retention_secs: i64) -> Result<u64>;
}

/// The remote analysis service. `submit` resolves on acknowledgment; the
/// analysis itself completes asynchronously.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn submit(
        &self,
        user_id: &str,
        session_id: &str,
        question: &str,
        brand_name: &str,
    ) -> Result<()>;

    async fn status(&self, user_id: &str, session_id: &str) -> Result<StatusSnapshot>;
}

/// Dependency container passed to the orchestrator and poller at
/// construction time. Client lifecycles are owned by the process entry
/// point; nothing in the core reaches for global state.
#[derive(Clone)]
pub struct CoreDeps {
    pub cache: Arc<dyn ResultCache>,
    pub ledger: Arc<dyn RequestLedger>,
    /// Absent when no backend endpoint is configured. New attempts are
    /// refused with a terminal outcome in that case.
    pub backend: Option<Arc<dyn AnalysisBackend>>,
    pub cache_ttl_secs: i64,
}

impl CoreDeps {
    pub fn new(
        cache: Arc<dyn ResultCache>,
        ledger: Arc<dyn RequestLedger>,
        backend: Option<Arc<dyn AnalysisBackend>>,
        cache_ttl_secs: i64,
    ) -> Self {
        Self {
            cache,
            ledger,
            backend,
            cache_ttl_secs,
        }
    }
}
