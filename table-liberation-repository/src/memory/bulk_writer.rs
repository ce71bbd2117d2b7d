//! In-memory bulk writer.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::errors::BulkWriteError;
use crate::interfaces::BulkWriter;
use crate::types::{BulkWriteReport, DocumentWriteResult};
use table_liberation_shared::ID_FIELD;

/// Bulk writer that keeps every document it accepts.
///
/// Specific ids can be configured to be rejected, and whole calls can be
/// configured to fail, so callers can exercise both partial and total
/// failure handling.
#[derive(Debug, Default)]
pub struct InMemoryBulkWriter {
    rejections: HashMap<String, (String, String)>,
    failures: Mutex<HashMap<usize, BulkWriteError>>,
    call_count: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
    stored: Mutex<Vec<Value>>,
}

impl InMemoryBulkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the document with this id whenever it is written.
    pub fn with_rejection(
        mut self,
        id: impl Into<String>,
        error_code: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.rejections
            .insert(id.into(), (error_code.into(), reason.into()));
        self
    }

    /// Fail the `call`-th `write_bulk` call (1-based) outright.
    pub fn fail_on_call(mut self, call: usize, error: BulkWriteError) -> Self {
        self.failures.get_mut().insert(call, error);
        self
    }

    /// Number of `write_bulk` calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Documents of every call that reached the writer, one entry per call.
    pub async fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().await.clone()
    }

    /// Accepted documents, parsed, in the order they were written.
    pub async fn stored_documents(&self) -> Vec<Value> {
        self.stored.lock().await.clone()
    }

    fn write_one(
        &self,
        document: &str,
    ) -> Result<(DocumentWriteResult, Option<Value>), BulkWriteError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| BulkWriteError::serialization(format!("Invalid document: {}", e)))?;

        let id = match value.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                return Ok((
                    DocumentWriteResult::rejected("", "bad_request", "Document has no _id"),
                    None,
                ))
            }
        };

        match self.rejections.get(&id) {
            Some((code, reason)) => Ok((DocumentWriteResult::rejected(id, code, reason), None)),
            None => Ok((DocumentWriteResult::ok(id), Some(value))),
        }
    }
}

#[async_trait]
impl BulkWriter for InMemoryBulkWriter {
    async fn write_bulk(&self, documents: &[String]) -> Result<BulkWriteReport, BulkWriteError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(error) = self.failures.lock().await.remove(&call) {
            return Err(error);
        }

        let mut results = Vec::with_capacity(documents.len());
        let mut accepted = Vec::new();
        for document in documents {
            let (result, value) = self.write_one(document)?;
            results.push(result);
            accepted.extend(value);
        }

        self.batches.lock().await.push(documents.to_vec());
        self.stored.lock().await.extend(accepted);

        Ok(BulkWriteReport::from_results(results))
    }
}
