use thiserror::Error;

/// Failures raised by the record and log stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    AlreadyExists,
    #[error("record not found")]
    NotFound,
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A raw check record failed field validation and was dropped for this
/// cycle. The record is retried on the next cycle without penalty.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("check field `{0}` is missing or malformed")]
    InvalidField(&'static str),
}

/// Failures raised by the alert gateway. Alerts are best-effort, so these
/// are logged and never retried.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid alert parameters: {0}")]
    InvalidParameters(&'static str),
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway rejected message with status {0}")]
    Rejected(u16),
}
