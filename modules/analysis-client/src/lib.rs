pub mod error;
pub mod types;

pub use error::{AnalysisClientError, Result};
pub use types::{QueryRequest, StatusResponse};

use std::time::Duration;

const USER_AGENT: &str = "brandpulse/1.0";

/// HTTP client for the remote analysis backend. Submission is
/// acknowledge-only: the backend runs the analysis asynchronously and the
/// caller discovers completion through status checks.
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl AnalysisClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Submit an analysis job. Returns once the backend acknowledges the
    /// submission; the analysis itself keeps running remotely.
    pub async fn submit(
        &self,
        user_id: &str,
        session_id: &str,
        question: &str,
        brand_name: &str,
    ) -> Result<()> {
        let body = QueryRequest {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            question: question.to_string(),
            brand_name: brand_name.to_string(),
        };

        let mut req = self
            .client
            .post(format!("{}/query", self.base_url))
            .header("User-Agent", USER_AGENT)
            .json(&body);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AnalysisClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(user_id, session_id, "Analysis submission acknowledged");
        Ok(())
    }

    /// Fetch the current status of a submitted job.
    pub async fn status(&self, user_id: &str, session_id: &str) -> Result<StatusResponse> {
        let mut req = self
            .client
            .get(format!("{}/status/{user_id}/{session_id}", self.base_url))
            .header("User-Agent", USER_AGENT);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AnalysisClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}
