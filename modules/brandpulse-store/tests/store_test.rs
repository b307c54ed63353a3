//! Integration tests for the Postgres ledger and cache.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use brandpulse_common::{Coordinates, RequestRecord, RequestStatus};
use brandpulse_core::{RequestLedger, ResultCache};
use brandpulse_store::{migrate, PgLedger, PgResultCache};

/// Get a test database pool, or skip if no test DB is available.
async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;

    migrate(&pool).await.ok()?;

    // Clean slate for each test
    sqlx::query("TRUNCATE brand_analysis_requests")
        .execute(&pool)
        .await
        .ok()?;
    sqlx::query("TRUNCATE analysis_cache")
        .execute(&pool)
        .await
        .ok()?;

    Some(pool)
}

fn record(question: &str, status: RequestStatus) -> RequestRecord {
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

// =========================================================================
// Ledger
// =========================================================================

#[tokio::test]
async fn insert_then_find_by_identity() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let ledger = PgLedger::new(pool);

    let rec = record("analyze the brand tesla united states technology", RequestStatus::Pending);
    ledger.insert(&rec).await.unwrap();

    let found = ledger
        .find_by_identity(&rec.user_id, &rec.session_id)
        .await
        .unwrap()
        .expect("row should exist");
    assert_eq!(found.id, rec.id);
    assert_eq!(found.status, RequestStatus::Pending);
    assert!(found.results.is_none());
}

#[tokio::test]
async fn find_latest_by_question_prefers_most_recent() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let ledger = PgLedger::new(pool);
    let question = "analyze the brand tesla united states technology";

    let mut older = record(question, RequestStatus::Failed);
    older.created_at = Utc::now() - chrono::Duration::minutes(30);
    older.updated_at = older.created_at;
    ledger.insert(&older).await.unwrap();

    let newer = record(question, RequestStatus::Running);
    ledger.insert(&newer).await.unwrap();

    let found = ledger
        .find_latest_by_question(question)
        .await
        .unwrap()
        .expect("row should exist");
    assert_eq!(found.id, newer.id);
    assert_eq!(found.status, RequestStatus::Running);
}

#[tokio::test]
async fn unknown_identity_is_absent() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let ledger = PgLedger::new(pool);

    let found = ledger
        .find_by_identity("user-nobody", "session-nothing")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn sweep_deletes_only_stale_failed_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let ledger = PgLedger::new(pool);
    let question = "analyze the brand acme berlin retail";

    let mut stale_failed = record(question, RequestStatus::Failed);
    stale_failed.created_at = Utc::now() - chrono::Duration::hours(2);
    ledger.insert(&stale_failed).await.unwrap();

    let fresh_failed = record(question, RequestStatus::Failed);
    ledger.insert(&fresh_failed).await.unwrap();

    let mut stale_running = record(question, RequestStatus::Running);
    stale_running.created_at = Utc::now() - chrono::Duration::hours(2);
    ledger.insert(&stale_running).await.unwrap();

    let deleted = ledger.delete_stale_failed(3_600).await.unwrap();
    assert_eq!(deleted, 1);

    // The fresh failed row and the old running row survive.
    assert!(ledger
        .find_by_identity(&fresh_failed.user_id, &fresh_failed.session_id)
        .await
        .unwrap()
        .is_some());
    assert!(ledger
        .find_by_identity(&stale_running.user_id, &stale_running.session_id)
        .await
        .unwrap()
        .is_some());
    assert!(ledger
        .find_by_identity(&stale_failed.user_id, &stale_failed.session_id)
        .await
        .unwrap()
        .is_none());
}

// =========================================================================
// Cache
// =========================================================================

#[tokio::test]
async fn cache_set_get_roundtrip_and_overwrite() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let cache = PgResultCache::new(pool);
    let key = "brand_analysis:tesla:united states:technology";

    let payload = json!({"brand_name": "Tesla", "total_mentions": 18});
    cache.set(key, &payload, 3_600).await.unwrap();
    assert_eq!(cache.get(key).await.unwrap(), Some(payload));

    let newer = json!({"brand_name": "Tesla", "total_mentions": 25});
    cache.set(key, &newer, 3_600).await.unwrap();
    assert_eq!(cache.get(key).await.unwrap(), Some(newer));
}

#[tokio::test]
async fn expired_entries_read_as_misses_and_are_evictable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let cache = PgResultCache::new(pool);
    let key = "brand_analysis:acme:berlin:retail";

    // Already expired on write.
    cache.set(key, &json!({"ok": true}), -60).await.unwrap();
    assert!(cache.get(key).await.unwrap().is_none());

    let evicted = cache.evict_expired().await.unwrap();
    assert_eq!(evicted, 1);
}

#[tokio::test]
async fn delete_removes_the_entry() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let cache = PgResultCache::new(pool);
    let key = "brand_analysis:tesla:germany:automotive";

    cache.set(key, &json!({"ok": true}), 3_600).await.unwrap();
    cache.delete(key).await.unwrap();
    assert!(cache.get(key).await.unwrap().is_none());
}
