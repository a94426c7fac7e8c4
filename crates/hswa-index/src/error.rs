//! Error types for index construction, search, and persistence

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Index errors
#[derive(Debug, Error)]
pub enum IndexError {
    /// Parallel record/vector sequences have different lengths
    #[error("Record/vector length mismatch: {records} records but {vectors} vectors")]
    LengthMismatch { records: usize, vectors: usize },

    /// A vector does not match the declared dimensionality
    #[error("Dimension mismatch at entry {position}: expected {expected}, got {actual}")]
    DimensionMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },

    /// Query vector dimensionality does not match the index
    #[error("Query dimension mismatch: index has {expected} dimensions, query has {actual}")]
    QueryDimensionMismatch { expected: usize, actual: usize },

    /// Artifact is not an index file, or was written by an incompatible version
    #[error("Invalid index artifact '{path}': {message}")]
    Format { path: String, message: String },

    /// Serialization failure while persisting
    #[error("Failed to encode index: {0}")]
    Encode(String),

    /// Deserialization failure while loading
    #[error("Failed to decode index: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Create a format error for an artifact path
    pub fn format(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }
}
