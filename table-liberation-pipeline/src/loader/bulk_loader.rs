//! Loads documents into the destination through a bulk writer.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::loader::batcher::{BulkBatcher, BulkWriteBatch};
use table_liberation_repository::{BulkWriter, DocumentWriteResult};
use table_liberation_shared::Document;

/// What a loader wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Bulk calls that returned a report.
    pub batches_submitted: usize,
    /// Documents the destination accepted.
    pub documents_written: usize,
    /// Documents the destination rejected.
    pub documents_rejected: usize,
    /// Every rejected document, in submission order.
    pub rejections: Vec<DocumentWriteResult>,
}

/// Loader that batches documents and submits each full batch.
///
/// A bulk call that fails as a whole is fatal. Documents rejected
/// individually are logged and recorded; the load continues.
pub struct BulkLoader {
    writer: Arc<dyn BulkWriter>,
    batcher: BulkBatcher,
    summary: LoadSummary,
}

impl BulkLoader {
    /// Create a new loader.
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination of the bulk calls
    /// * `threshold` - Documents per bulk call, at least 1
    pub fn new(writer: Arc<dyn BulkWriter>, threshold: usize) -> Result<Self, PipelineError> {
        Ok(Self {
            writer,
            batcher: BulkBatcher::new(threshold)?,
            summary: LoadSummary::default(),
        })
    }

    /// Documents waiting for the next bulk call.
    pub fn pending_len(&self) -> usize {
        self.batcher.pending_len()
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    /// Queue a document, submitting a bulk call once the batch is full.
    pub async fn push(&mut self, document: Document) -> Result<(), PipelineError> {
        match self.batcher.push(document) {
            Some(batch) => self.submit(batch).await,
            None => Ok(()),
        }
    }

    /// Submit whatever is pending and return the totals.
    pub async fn finish(mut self) -> Result<LoadSummary, PipelineError> {
        if let Some(batch) = self.batcher.finish() {
            self.submit(batch).await?;
        }
        Ok(self.summary)
    }

    #[instrument(skip(self, batch), fields(count = batch.len()))]
    async fn submit(&mut self, batch: BulkWriteBatch) -> Result<(), PipelineError> {
        let documents = batch.to_json_strings()?;

        let report = match self.writer.write_bulk(&documents).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, count = documents.len(), "Bulk write failed");
                return Err(e.into());
            }
        };

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "{} inserted successfully",
            report.succeeded
        );

        for rejected in report.rejected() {
            warn!(
                id = %rejected.id,
                reason = rejected.reason.as_deref().unwrap_or_default(),
                error = rejected.error_code.as_deref().unwrap_or_default(),
                "Document rejected"
            );
        }

        self.summary.batches_submitted += 1;
        self.summary.documents_written += report.succeeded;
        self.summary.documents_rejected += report.failed;
        self.summary
            .rejections
            .extend(report.results.into_iter().filter(|r| !r.success));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use table_liberation_repository::{BulkWriteError, InMemoryBulkWriter};
    use table_liberation_shared::DocumentMetadata;

    fn document(n: usize) -> Document {
        let metadata = DocumentMetadata {
            table: "Orders".to_string(),
            partition_key: "A".to_string(),
            row_key: n.to_string(),
            timestamp: DateTime::parse_from_rfc3339("2014-03-01T10:00:00+00:00").unwrap(),
            etag: "etag".to_string(),
        };
        Document::new(format!("Orders-A-{}", n), metadata)
    }

    #[tokio::test]
    async fn test_submits_full_batches_and_remainder() {
        let writer = Arc::new(InMemoryBulkWriter::new());
        let mut loader = BulkLoader::new(writer.clone(), 2).unwrap();

        for n in 0..5 {
            loader.push(document(n)).await.unwrap();
        }
        assert_eq!(writer.call_count(), 2);
        assert_eq!(loader.pending_len(), 1);

        let summary = loader.finish().await.unwrap();
        assert_eq!(summary.batches_submitted, 3);
        assert_eq!(summary.documents_written, 5);
        assert_eq!(summary.documents_rejected, 0);

        let sizes: Vec<usize> = writer.batches().await.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_partial_rejection_is_recorded() {
        let writer = Arc::new(InMemoryBulkWriter::new().with_rejection(
            "Orders-A-1",
            "conflict",
            "Document update conflict.",
        ));
        let mut loader = BulkLoader::new(writer.clone(), 10).unwrap();

        for n in 0..3 {
            loader.push(document(n)).await.unwrap();
        }
        let summary = loader.finish().await.unwrap();

        assert_eq!(summary.documents_written, 2);
        assert_eq!(summary.documents_rejected, 1);
        assert_eq!(
            summary.rejections,
            vec![DocumentWriteResult::rejected(
                "Orders-A-1",
                "conflict",
                "Document update conflict."
            )]
        );
    }

    #[tokio::test]
    async fn test_writer_failure_is_fatal() {
        let writer = Arc::new(
            InMemoryBulkWriter::new().fail_on_call(1, BulkWriteError::connection("refused")),
        );
        let mut loader = BulkLoader::new(writer.clone(), 1).unwrap();

        let err = loader.push(document(0)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::BulkWriteError(BulkWriteError::ConnectionError(_))
        ));
        assert_eq!(loader.summary().batches_submitted, 0);
    }

    #[tokio::test]
    async fn test_nothing_pending_makes_no_call() {
        let writer = Arc::new(InMemoryBulkWriter::new());
        let loader = BulkLoader::new(writer.clone(), 3).unwrap();

        let summary = loader.finish().await.unwrap();
        assert_eq!(summary, LoadSummary::default());
        assert_eq!(writer.call_count(), 0);
    }
}
