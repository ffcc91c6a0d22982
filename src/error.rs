use thiserror::Error;

/// Unified error type for the mihomo-pool tool
#[derive(Error, Debug)]
pub enum PoolError {
    // Subscription errors
    #[error("Subscription fetch failed: {0}")]
    Fetch(String),

    #[error("Subscription parse failed: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid subscription URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No proxies available")]
    NoProxiesAvailable,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Orchestration errors
    #[error("Container runtime error: {0}")]
    Orchestrator(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mihomo-pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

// Convert from reqwest errors
impl From<reqwest::Error> for PoolError {
    fn from(err: reqwest::Error) -> Self {
        PoolError::Fetch(err.to_string())
    }
}
