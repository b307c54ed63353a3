//! In-memory fakes for the orchestrator/poller collaborator traits.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use brandpulse_common::{Coordinates, RequestRecord, RequestStatus, StatusSnapshot};
use brandpulse_core::{AnalysisBackend, CoreDeps, RequestLedger, ResultCache};

// ---------------------------------------------------------------------------
// Fake cache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, Value>>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl FakeCache {
    pub fn with_entry(key: &str, value: Value) -> Self {
        let cache = Self::default();
        cache
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value);
        cache
    }

    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ResultCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value, _ttl_secs: i64) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn evict_expired(&self) -> Result<u64> {
        Ok(0)
    }
}

// ---------------------------------------------------------------------------
// Fake ledger
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeLedger {
    rows: Mutex<Vec<RequestRecord>>,
    pub fail_reads: AtomicBool,
}

impl FakeLedger {
    pub fn with_row(record: RequestRecord) -> Self {
        let ledger = Self::default();
        ledger.rows.lock().unwrap().push(record);
        ledger
    }

    pub fn rows(&self) -> Vec<RequestRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestLedger for FakeLedger {
    async fn insert(&self, record: &RequestRecord) -> Result<()> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_by_identity(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<RequestRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("ledger unavailable"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.session_id == session_id)
            .max_by_key(|r| (r.updated_at, r.created_at))
            .cloned())
    }

    async fn find_latest_by_question(&self, question: &str) -> Result<Option<RequestRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("ledger unavailable"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.question == question)
            .max_by_key(|r| (r.updated_at, r.created_at))
            .cloned())
    }

    async fn delete_stale_failed(&self, retention_secs: i64) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::seconds(retention_secs);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.status == RequestStatus::Failed && r.created_at < cutoff));
        Ok((before - rows.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Fake backend
// ---------------------------------------------------------------------------

/// Scripted backend: `submit` counts acks (or refuses), `status` pops a
/// scripted response and falls back to `running` when the script runs out.
#[derive(Default)]
pub struct FakeBackend {
    pub submissions: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub refuse_submissions: AtomicBool,
    script: Mutex<VecDeque<Result<StatusSnapshot>>>,
}

impl FakeBackend {
    pub fn with_script(script: Vec<Result<StatusSnapshot>>) -> Self {
        let backend = Self::default();
        *backend.script.lock().unwrap() = script.into();
        backend
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn submit(
        &self,
        _user_id: &str,
        _session_id: &str,
        _question: &str,
        _brand_name: &str,
    ) -> Result<()> {
        if self.refuse_submissions.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn status(&self, _user_id: &str, _session_id: &str) -> Result<StatusSnapshot> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(StatusSnapshot {
                status: RequestStatus::Running,
                results: None,
                error_message: None,
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn snapshot(status: RequestStatus) -> StatusSnapshot {
    StatusSnapshot {
        status,
        results: None,
        error_message: None,
    }
}

pub fn completed_snapshot(results: Value) -> StatusSnapshot {
    StatusSnapshot {
        status: RequestStatus::Completed,
        results: Some(results),
        error_message: None,
    }
}

pub fn record(question: &str, status: RequestStatus) -> RequestRecord {
    let coords = Coordinates::generate();
    let now = Utc::now();
    RequestRecord {
        id: Uuid::new_v4(),
        user_id: coords.user_id,
        session_id: coords.session_id,
        question: question.to_string(),
        brand: "tesla".to_string(),
        location: "united states".to_string(),
        category: "technology".to_string(),
        status,
        results: None,
        error_message: None,
        created_at: now,
        updated_at: now,
    }
}

/// A payload that passes structural validation.
pub fn valid_results() -> Value {
    json!({
        "brand_name": "Tesla",
        "overall_sentiment": { "positive": 40.0, "negative": 30.0, "neutral": 30.0 },
        "platform_sentiment": {
            "Twitter":  { "positive": 40.0, "negative": 30.0, "neutral": 30.0, "count": 5 },
            "LinkedIn": { "positive": 80.0, "negative": 0.0, "neutral": 20.0, "count": 2 },
            "Reddit":   { "positive": 10.0, "negative": 60.0, "neutral": 30.0, "count": 4 },
            "News":     { "positive": 20.0, "negative": 40.0, "neutral": 40.0, "count": 7 }
        }
    })
}

pub fn deps(
    cache: Arc<FakeCache>,
    ledger: Arc<FakeLedger>,
    backend: Option<Arc<FakeBackend>>,
) -> CoreDeps {
    CoreDeps::new(
        cache,
        ledger,
        backend.map(|b| b as Arc<dyn AnalysisBackend>),
        86_400,
    )
}
