use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON document: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write event journal: {0}")]
    JournalError(#[from] csv::Error),

    /// Malformed arguments, out-of-range index or missing mandatory fields.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Port not found, port disabled, no single active link, stale catalog.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Quality or resource rejection that leaves nothing to return.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The external quality computation could not produce a result.
    #[error("Calculation failed: {0}")]
    CalculationFailed(String),

    /// The requested lifecycle transition is not allowed in the current state.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Failed to build network model: {0}")]
    ModelConstructionError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
