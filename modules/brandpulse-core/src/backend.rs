use analysis_client::AnalysisClient;
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use brandpulse_common::{RequestStatus, StatusSnapshot};

use crate::deps::AnalysisBackend;

/// `AnalysisBackend` implemented over the backend's REST API.
pub struct HttpAnalysisBackend {
    client: AnalysisClient,
}

impl HttpAnalysisBackend {
    pub fn new(endpoint_url: &str, token: Option<&str>) -> Self {
        Self {
            client: AnalysisClient::new(endpoint_url, token),
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn submit(
        &self,
        user_id: &str,
        session_id: &str,
        question: &str,
        brand_name: &str,
    ) -> Result<()> {
        self.client
            .submit(user_id, session_id, question, brand_name)
            .await?;
        Ok(())
    }

    async fn status(&self, user_id: &str, session_id: &str) -> Result<StatusSnapshot> {
        let resp = self.client.status(user_id, session_id).await?;

        // The backend is an external system; a status string we don't
        // recognize is treated as not-yet-started so polling keeps going.
        let status = RequestStatus::parse(&resp.status).unwrap_or_else(|| {
            warn!(user_id, session_id, status = resp.status.as_str(), "Unknown backend status");
            RequestStatus::Pending
        });

        Ok(StatusSnapshot {
            status,
            results: resp.results,
            error_message: resp.error_message,
        })
    }
}
