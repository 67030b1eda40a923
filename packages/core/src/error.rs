//! Error types for message decoding and pipeline dispatch

use fieldline_client::PlatformError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Why a raw message could not be turned into a payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed source timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Message is neither a binary point batch nor recognizable JSON")]
    UndecodableMessage,

    #[error("Unsupported wire contract version: {0}")]
    UnsupportedVersion(u32),
}

/// Why processing a decoded payload failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Asset reference has no downstream match: {0}")]
    UnresolvedAssetReference(String),

    #[error("Annotation class id {0} is outside the label table")]
    UnknownAnnotationLabel(i64),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
