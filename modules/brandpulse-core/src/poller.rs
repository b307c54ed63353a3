//! The single polling loop: bounded, fixed-interval, cancellable.
//!
//! Checks are strictly sequential: the next status read is never issued
//! before the previous one resolves. Cancellation is cooperative: dropping
//! or aborting the `poll` future at any await point stops all further
//! I/O, since both the sleep and the status read are cancel-safe.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};

use brandpulse_common::{AnalysisQuery, Coordinates, RequestStatus};

use crate::deps::CoreDeps;
use crate::fingerprint::Fingerprint;
use crate::orchestrator::fetch_snapshot;

/// Wall-clock ceiling and check interval for one poll. The defaults
/// encode the deployment policy: give up after five minutes, check every
/// twenty seconds.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    pub max_duration: Duration,
    pub interval: Duration,
}

impl PollBudget {
    pub fn new(max_duration: Duration, interval: Duration) -> Self {
        Self {
            max_duration,
            interval,
        }
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(300),
            interval: Duration::from_secs(20),
        }
    }
}

/// Terminal result of one poll. No partial results are ever surfaced.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Completed { results: Value },
    Failed { message: String },
    /// The budget expired while the attempt was still non-terminal. The
    /// analysis may yet complete; a retry starts a fresh attempt.
    TimedOut,
    /// The budget expired and the most recent status check failed at the
    /// transport layer. Distinct from `TimedOut` so the caller can tell
    /// "backend slow" from "backend unreachable".
    Errored { message: String },
}

pub struct Poller {
    deps: CoreDeps,
}

impl Poller {
    pub fn new(deps: CoreDeps) -> Self {
        Self { deps }
    }

    /// Poll one attempt to a terminal outcome. The original query is
    /// needed alongside the coordinates: coordinates alone cannot
    /// re-derive the fingerprint under which a completed payload is
    /// cached.
    pub async fn poll(
        &self,
        query: &AnalysisQuery,
        coordinates: &Coordinates,
        budget: PollBudget,
    ) -> PollOutcome {
        let fp = Fingerprint::new(query);
        let started = Instant::now();
        // Transport errors are retriable: they consume budget rather than
        // terminating the loop. Only the most recent one matters.
        let mut last_transport_error: Option<String> = None;

        loop {
            if started.elapsed() >= budget.max_duration {
                return match last_transport_error {
                    Some(message) => PollOutcome::Errored { message },
                    None => PollOutcome::TimedOut,
                };
            }

            match fetch_snapshot(&self.deps, coordinates).await {
                Ok(snapshot) => {
                    last_transport_error = None;
                    match snapshot.status {
                        RequestStatus::Completed => {
                            if let Some(results) = snapshot.results {
                                self.store_completed(&fp, &results).await;
                                info!(
                                    user_id = coordinates.user_id.as_str(),
                                    session_id = coordinates.session_id.as_str(),
                                    elapsed_secs = started.elapsed().as_secs(),
                                    "Analysis completed"
                                );
                                return PollOutcome::Completed { results };
                            }
                            // Completed without a payload: the ledger write
                            // may still be in flight. Keep checking.
                            warn!(
                                user_id = coordinates.user_id.as_str(),
                                "Completed status with no results, continuing to poll"
                            );
                        }
                        RequestStatus::Failed => {
                            return PollOutcome::Failed {
                                message: snapshot
                                    .error_message
                                    .unwrap_or_else(|| "analysis failed".to_string()),
                            };
                        }
                        RequestStatus::Pending | RequestStatus::Running => {}
                    }
                }
                Err(e) => {
                    warn!(
                        user_id = coordinates.user_id.as_str(),
                        session_id = coordinates.session_id.as_str(),
                        elapsed_secs = started.elapsed().as_secs(),
                        error = %e,
                        "Status check failed, will retry"
                    );
                    last_transport_error = Some(e.to_string());
                }
            }

            tokio::time::sleep(budget.interval).await;
        }
    }

    /// Make sure future identical queries hit the cache. A write failure
    /// costs a recompute later, not this result.
    async fn store_completed(&self, fp: &Fingerprint, results: &Value) {
        let key = fp.cache_key();
        if let Err(e) = self
            .deps
            .cache
            .set(&key, results, self.deps.cache_ttl_secs)
            .await
        {
            warn!(cache_key = key.as_str(), error = %e, "Failed to cache completed results");
        }
    }
}
