//! Error types for chunkjar
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ChunkJarError
pub type Result<T> = std::result::Result<T, ChunkJarError>;

/// Unified error type for chunkjar operations
#[derive(Debug, Error)]
pub enum ChunkJarError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backing store lacks the primitive an operation needs.
    ///
    /// Never returned to callers of the adapters: the operation is skipped
    /// and this error is logged as a warning.
    #[error("Unsupported capability: backing store cannot {operation}")]
    UnsupportedCapability { operation: &'static str },

    // -------------------------------------------------------------------------
    // Backing Store Errors
    // -------------------------------------------------------------------------
    #[error("Backing store error: {0}")]
    Backing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChunkJarError {
    fn from(err: serde_json::Error) -> Self {
        ChunkJarError::Serialization(err.to_string())
    }
}
