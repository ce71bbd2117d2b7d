//! Error types for the table liberation pipeline.

use table_liberation_repository::{BulkWriteError, StoreError};
use thiserror::Error;

/// Errors that can occur in the table liberation pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The table store failed; the stream it fed has ended.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// A bulk write failed as a whole.
    #[error("Bulk write error: {0}")]
    BulkWriteError(#[from] BulkWriteError),

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
