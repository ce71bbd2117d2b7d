//! Table store error types.
//!
//! Failures of a paged fetch are surfaced to the pipeline verbatim. None of
//! them is retried; each one ends the stream it occurred in.

use thiserror::Error;

/// Errors returned by a [`TableStore`](crate::TableStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The store refused the credentials.
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// The query itself was rejected, e.g. a token that does not belong to it.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The named table does not exist.
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an authorization error.
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::AuthorizationError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a table not found error.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound(table.into())
    }
}
