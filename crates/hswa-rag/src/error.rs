//! Error types for the retrieval pipeline
//!
//! The taxonomy follows the operational split: configuration errors are
//! detected before work starts and never silently corrected; resource errors
//! name the missing or corrupt artifact; generation-service failures carry a
//! distinct kind so callers can layer their own retry policy. Weak retrieval
//! is not an error at all — the prompt handles it.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kind reported by the hosted generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Request exceeded the caller-supplied timeout
    Timeout,
    /// Authentication or authorization failure
    Auth,
    /// Service rate limit hit
    RateLimited,
    /// Any other service-side failure
    Service,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Auth => write!(f, "auth"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (bad chunk parameters, model mismatch)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document could not be loaded or parsed
    #[error("Failed to load document '{path}': {message}")]
    Document { path: String, message: String },

    /// Embedding generation failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    Index(#[from] hswa_index::IndexError),

    /// Hosted generation service failure, surfaced unmodified
    #[error("Generation service error ({kind}): {message}")]
    Generation {
        kind: GenerationErrorKind,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a document error for a source path
    pub fn document(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Document {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error of the given kind
    pub fn generation(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self::Generation {
            kind,
            message: message.into(),
        }
    }
}
