use thiserror::Error;

pub type Result<T> = std::result::Result<T, BillingError>;

/// Every failure in the billing session is locally recoverable; nothing
/// here is fatal to the process.
#[derive(Error, Debug)]
pub enum BillingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{entity} lookup failed: {reason}")]
    Lookup {
        entity: &'static str,
        reason: String,
    },
    #[error("search failed: {0}")]
    Search(String),
    #[error("bill submission failed: {0}")]
    Submission(String),
    #[error("validation error: {0}")]
    Validation(String),
}
