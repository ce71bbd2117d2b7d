//! Bulk writer trait definition.

use async_trait::async_trait;

use crate::errors::BulkWriteError;
use crate::types::BulkWriteReport;

/// Abstract interface for a document store's batched write call.
#[async_trait]
pub trait BulkWriter: Send + Sync {
    /// Write a batch of serialized documents.
    ///
    /// # Arguments
    ///
    /// * `documents` - JSON documents, each carrying its own `_id`
    ///
    /// # Returns
    ///
    /// * `Ok(BulkWriteReport)` - One result per document, in request order.
    ///   Individual documents may still have been rejected.
    /// * `Err(BulkWriteError)` - The call as a whole failed
    async fn write_bulk(&self, documents: &[String]) -> Result<BulkWriteReport, BulkWriteError>;
}
