use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Query identity ---

/// A brand analysis query as submitted by the UI. Free text; identity
/// comparisons always go through the normalized fingerprint, never the
/// raw fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisQuery {
    pub brand: String,
    pub location: String,
    pub category: String,
}

impl AnalysisQuery {
    pub fn new(
        brand: impl Into<String>,
        location: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            location: location.into(),
            category: category.into(),
        }
    }
}

/// The `(user_id, session_id)` pair identifying one analysis attempt.
/// Returned to the caller as polling coordinates and stable for the
/// lifetime of the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub user_id: String,
    pub session_id: String,
}

impl Coordinates {
    /// Generate fresh random coordinates for a new attempt.
    /// UUID-derived hex gives far more than enough entropy to make an
    /// accidental collision with an existing identity implausible.
    pub fn generate() -> Self {
        let user = Uuid::new_v4().simple().to_string();
        let session = Uuid::new_v4().simple().to_string();
        Self {
            user_id: format!("user-{}", &user[..8]),
            session_id: format!("session-{}", &session[..12]),
        }
    }
}

// --- Request lifecycle ---

/// Lifecycle status of an analysis attempt. Transitions happen externally
/// (the backend writes the ledger); the core only reads. Any of the four
/// may appear at read time, including `failed` immediately after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Running => "running",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "running" => Some(RequestStatus::Running),
            "completed" => Some(RequestStatus::Completed),
            "failed" => Some(RequestStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable record of one analysis attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub user_id: String,
    pub session_id: String,
    /// Natural-language dedup key, re-derivable from the normalized query.
    pub question: String,
    pub brand: String,
    pub location: String,
    pub category: String,
    pub status: RequestStatus,
    pub results: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RequestRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

/// A single point-in-time status check for one attempt. The presentation
/// layer loops over this on its own timer when it owns the poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusSnapshot {
    /// Snapshot for an attempt no store knows about yet: the submission
    /// ack landed but neither the ledger row nor the backend's own record
    /// is visible. Treated as not-yet-started.
    pub fn not_started() -> Self {
        Self {
            status: RequestStatus::Pending,
            results: None,
            error_message: None,
        }
    }
}
