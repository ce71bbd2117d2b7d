//! Regrouping of documents into fixed-size bulk writes.

use crate::errors::PipelineError;
use table_liberation_shared::Document;

/// Documents submitted to the destination in one bulk call.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkWriteBatch {
    documents: Vec<Document>,
}

impl BulkWriteBatch {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Serialize every document to its wire form, in order.
    pub fn to_json_strings(&self) -> Result<Vec<String>, PipelineError> {
        self.documents
            .iter()
            .map(|doc| {
                doc.to_json_string().map_err(|e| {
                    PipelineError::serialization(format!("Failed to serialize {}: {}", doc.id(), e))
                })
            })
            .collect()
    }
}

/// Accumulates documents until a threshold is reached.
///
/// Every document pushed ends up in exactly one batch, batches keep push
/// order, and no batch is larger than the threshold.
#[derive(Debug)]
pub struct BulkBatcher {
    threshold: usize,
    pending: Vec<Document>,
}

impl BulkBatcher {
    /// Create a batcher. A zero threshold is rejected.
    pub fn new(threshold: usize) -> Result<Self, PipelineError> {
        if threshold == 0 {
            return Err(PipelineError::config("Bulk batch size must be at least 1"));
        }
        Ok(Self {
            threshold,
            pending: Vec::with_capacity(threshold),
        })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Documents waiting for the next batch.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Add a document, returning a full batch once the threshold is reached.
    pub fn push(&mut self, document: Document) -> Option<BulkWriteBatch> {
        self.pending.push(document);
        if self.pending.len() >= self.threshold {
            Some(self.take())
        } else {
            None
        }
    }

    /// Emit whatever is pending as a final, possibly undersized batch.
    pub fn finish(&mut self) -> Option<BulkWriteBatch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    fn take(&mut self) -> BulkWriteBatch {
        let documents = std::mem::replace(&mut self.pending, Vec::with_capacity(self.threshold));
        BulkWriteBatch::new(documents)
    }
}
