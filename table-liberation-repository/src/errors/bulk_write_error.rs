//! Bulk write error types.
//!
//! A `BulkWriteError` means the whole call failed. Documents rejected inside a
//! call that otherwise succeeded are reported per document in a
//! [`BulkWriteReport`](crate::BulkWriteReport) instead.

use thiserror::Error;

/// Errors returned by a [`BulkWriter`](crate::BulkWriter).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BulkWriteError {
    /// The destination could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The destination answered the whole request with an error status.
    #[error("Bulk write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// A document could not be serialized for the request.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The destination's response could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl BulkWriteError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a rejected error.
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
