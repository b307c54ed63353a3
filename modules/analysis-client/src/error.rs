use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisClientError>;

#[derive(Debug, Error)]
pub enum AnalysisClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

// Body-decode failures also arrive as reqwest errors; there is no
// separate parse path.
impl From<reqwest::Error> for AnalysisClientError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisClientError::Network(err.to_string())
    }
}
