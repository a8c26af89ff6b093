//! Error taxonomy for sysfetch-core.
//!
//! Missing or malformed release files are not errors; the resolver skips
//! them. What remains are failures the caller can act on.

/// sysfetch-core errors.
#[derive(Debug, thiserror::Error)]
pub enum SysfetchError {
    #[error("invalid config document: {0}")]
    InvalidConfig(String),

    #[error("external process error: {0}")]
    Process(String),

    #[error("signal handler error: {0}")]
    Signal(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sysfetch-core operations.
pub type Result<T> = std::result::Result<T, SysfetchError>;
