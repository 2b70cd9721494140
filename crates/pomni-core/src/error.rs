use thiserror::Error;

/// Top-level error type for Pomni.
#[derive(Debug, Error)]
pub enum PomniError {
    /// Task store unavailable or a query failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The answer engine failed (HTTP error, malformed response, quota).
    #[error("generation error: {0}")]
    Generation(String),

    /// Delivery through a messaging transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// An external call did not finish within its deadline.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
