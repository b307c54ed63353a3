//! Request de-duplication and submission.
//!
//! `start` decides, in order: serve from cache, serve or join a ledger
//! record, or submit a fresh attempt. Read failures against the cache or
//! ledger degrade to "not found": a duplicate backend call is an
//! acceptable cost, blocking the user is not.

use anyhow::Result;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use brandpulse_common::{
    payload::validate_results, AnalysisQuery, BrandPulseError, Coordinates, RequestRecord,
    RequestStatus, StatusSnapshot,
};

use crate::deps::CoreDeps;
use crate::fingerprint::Fingerprint;

/// Outcome of starting an analysis. Discriminated so the presentation
/// layer renders loading/error states without exception handling.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// A completed result was immediately available.
    Ready { results: Value },
    /// An attempt is running (existing or newly submitted); poll with the
    /// coordinates.
    InProgress { coordinates: Coordinates },
    /// Terminal: the orchestrator itself cannot proceed.
    Failed { reason: String },
}

pub struct Orchestrator {
    deps: CoreDeps,
}

impl Orchestrator {
    pub fn new(deps: CoreDeps) -> Self {
        Self { deps }
    }

    /// Start (or join) an analysis for a query.
    pub async fn start(&self, query: &AnalysisQuery) -> AnalysisOutcome {
        let fp = Fingerprint::new(query);
        let cache_key = fp.cache_key();
        let question = fp.question();

        // 1. Cache check.
        match self.deps.cache.get(&cache_key).await {
            Ok(Some(results)) => match validate_results(&results) {
                Ok(()) => {
                    info!(cache_key = cache_key.as_str(), "Serving cached analysis");
                    return AnalysisOutcome::Ready { results };
                }
                Err(reason) => {
                    warn!(
                        cache_key = cache_key.as_str(),
                        reason = reason.as_str(),
                        "Corrupted cache entry, invalidating"
                    );
                    let cache = self.deps.cache.clone();
                    let key = cache_key.clone();
                    tokio::spawn(async move {
                        if let Err(e) = cache.delete(&key).await {
                            warn!(cache_key = key.as_str(), error = %e, "Cache invalidation failed");
                        }
                    });
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(cache_key = cache_key.as_str(), error = %e, "Cache read failed, treating as miss");
            }
        }

        // 2. Ledger check: the most recent attempt for this identity.
        match self.deps.ledger.find_latest_by_question(&question).await {
            Ok(Some(record)) => match record.status {
                RequestStatus::Completed => {
                    if let Some(results) = record.results {
                        info!(
                            user_id = record.user_id.as_str(),
                            session_id = record.session_id.as_str(),
                            "Serving completed ledger record"
                        );
                        self.spawn_cache_repair(&cache_key, &results);
                        return AnalysisOutcome::Ready { results };
                    }
                    // Completed with no payload is unusable; start fresh.
                    warn!(
                        user_id = record.user_id.as_str(),
                        "Completed record has no results, starting a new attempt"
                    );
                }
                RequestStatus::Pending | RequestStatus::Running => {
                    info!(
                        user_id = record.user_id.as_str(),
                        session_id = record.session_id.as_str(),
                        status = %record.status,
                        "Joining in-flight attempt"
                    );
                    return AnalysisOutcome::InProgress {
                        coordinates: record.coordinates(),
                    };
                }
                RequestStatus::Failed => {
                    info!(
                        user_id = record.user_id.as_str(),
                        "Most recent attempt failed, starting a new one"
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(question = question.as_str(), error = %e, "Ledger read failed, proceeding with a new attempt");
            }
        }

        // 3. New attempt. Refuse before generating identifiers if there is
        // no backend to submit to.
        let Some(backend) = self.deps.backend.as_ref() else {
            return AnalysisOutcome::Failed {
                reason: "backend not configured".to_string(),
            };
        };

        let coordinates = Coordinates::generate();

        // Await only the submission ack; the analysis runs remotely. An
        // ack failure is surfaced immediately and leaves no ledger row, so
        // a dead submission can never become a join target.
        if let Err(e) = backend
            .submit(
                &coordinates.user_id,
                &coordinates.session_id,
                &question,
                query.brand.trim(),
            )
            .await
        {
            error!(
                user_id = coordinates.user_id.as_str(),
                session_id = coordinates.session_id.as_str(),
                error = %e,
                "Backend submission failed"
            );
            return AnalysisOutcome::Failed {
                reason: format!("submission failed: {e}"),
            };
        }

        let record = new_pending_record(&coordinates, &fp, &question);
        if let Err(e) = self.deps.ledger.insert(&record).await {
            // The attempt is already running remotely. Polling falls back
            // to the backend status endpoint when no row exists.
            warn!(
                user_id = coordinates.user_id.as_str(),
                session_id = coordinates.session_id.as_str(),
                error = %e,
                "Ledger insert failed after submission ack"
            );
        }

        info!(
            user_id = coordinates.user_id.as_str(),
            session_id = coordinates.session_id.as_str(),
            question = question.as_str(),
            "Submitted new analysis attempt"
        );
        AnalysisOutcome::InProgress { coordinates }
    }

    /// Single non-looping status check for one attempt. The ledger is the
    /// primary source; the backend is queried directly when no row exists
    /// yet (the row lands via the submission-acknowledgment path and can
    /// lag the backend's own state).
    pub async fn status(
        &self,
        coordinates: &Coordinates,
    ) -> Result<StatusSnapshot, BrandPulseError> {
        fetch_snapshot(&self.deps, coordinates).await
    }

    fn spawn_cache_repair(&self, cache_key: &str, results: &Value) {
        let cache = self.deps.cache.clone();
        let key = cache_key.to_string();
        let payload = results.clone();
        let ttl = self.deps.cache_ttl_secs;
        tokio::spawn(async move {
            if let Err(e) = cache.set(&key, &payload, ttl).await {
                warn!(cache_key = key.as_str(), error = %e, "Cache repair write failed");
            }
        });
    }
}

pub(crate) async fn fetch_snapshot(
    deps: &CoreDeps,
    coordinates: &Coordinates,
) -> Result<StatusSnapshot, BrandPulseError> {
    match deps
        .ledger
        .find_by_identity(&coordinates.user_id, &coordinates.session_id)
        .await
    {
        Ok(Some(record)) => {
            return Ok(StatusSnapshot {
                status: record.status,
                results: record.results,
                error_message: record.error_message,
            });
        }
        Ok(None) => {}
        Err(e) => {
            // With no backend to fall back to, an unreadable ledger
            // cannot be papered over as "not started".
            if deps.backend.is_none() {
                return Err(BrandPulseError::Ledger(e.to_string()));
            }
            warn!(
                user_id = coordinates.user_id.as_str(),
                session_id = coordinates.session_id.as_str(),
                error = %e,
                "Ledger status read failed, falling back to backend"
            );
        }
    }

    match deps.backend.as_ref() {
        Some(backend) => backend
            .status(&coordinates.user_id, &coordinates.session_id)
            .await
            .map_err(|e| BrandPulseError::Backend(e.to_string())),
        None => Ok(StatusSnapshot::not_started()),
    }
}

fn new_pending_record(
    coordinates: &Coordinates,
    fp: &Fingerprint,
    question: &str,
) -> RequestRecord {
    let now = chrono::Utc::now();
    RequestRecord {
        id: Uuid::new_v4(),
        user_id: coordinates.user_id.clone(),
        session_id: coordinates.session_id.clone(),
        question: question.to_string(),
        brand: fp.brand().to_string(),
        location: fp.location().to_string(),
        category: fp.category().to_string(),
        status: RequestStatus::Pending,
        results: None,
        error_message: None,
        created_at: now,
        updated_at: now,
    }
}
