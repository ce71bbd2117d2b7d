//! Table identity and pagination tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of one remote table.
///
/// A `TableName` is fixed for the lifetime of a fetch operation and forms the
/// first component of every document id produced from the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    /// Create a table name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The table name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TableName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Opaque cursor handed back by the remote store alongside a page of rows.
///
/// A token is only meaningful to the query that produced it and must be passed
/// back on the very next call. Its absence marks the end of pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
