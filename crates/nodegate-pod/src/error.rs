//! Error types for the pod annotation codec.

use thiserror::Error;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding pod annotations.
///
/// None of these abort annotation building; the affected annotation is
/// skipped and the rest of the map is kept.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("annotations exceed budget: {size} > {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("decompressed annotation exceeds {limit} bytes")]
    DecompressedTooLarge { limit: usize },
}
