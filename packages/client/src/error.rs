//! Error type for platform operations

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Error type for platform operations
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Platform returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed platform response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// True when a fresh session and a second attempt could plausibly
    /// succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PlatformError::Network(_) => true,
            PlatformError::Api { status, .. } => {
                matches!(status, 401 | 403 | 408 | 429) || *status >= 500
            }
            PlatformError::Config(_) | PlatformError::Auth(_) | PlatformError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(value: reqwest::Error) -> Self {
        PlatformError::Network(value.to_string())
    }
}
