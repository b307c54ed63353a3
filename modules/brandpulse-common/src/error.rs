use thiserror::Error;

/// Failures surfaced across the core boundary. The start/poll paths
/// speak outcome enums instead; only the status snapshot propagates an
/// error, and these are the two seams it can fail at.
#[derive(Error, Debug)]
pub enum BrandPulseError {
    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
