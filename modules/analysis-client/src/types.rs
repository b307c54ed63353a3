use serde::{Deserialize, Serialize};

/// Body for `POST /query`. The backend accepts the job and processes it
/// asynchronously; the response is an acknowledgment, not results.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub question: String,
    pub brand_name: String,
}

/// Response from `GET /status/{userId}/{sessionId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}
