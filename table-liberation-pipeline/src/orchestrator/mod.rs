//! Orchestrator module for the table liberation pipeline.
//!
//! Coordinates the fetch loop, processor, and loader for one table at a time.

use futures::StreamExt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::consumer::{FetchOutcome, RecordStream, TableFetcher};
use crate::errors::PipelineError;
use crate::loader::BulkLoader;
use crate::processor::RecordProcessor;
use table_liberation_repository::{BulkWriter, DocumentWriteResult, TableStore};
use table_liberation_shared::TableName;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Rows requested per store round trip.
    pub fetch_batch_size: NonZeroUsize,
    /// Documents per bulk write.
    pub bulk_batch_size: usize,
    /// Pages buffered between the fetch loop and the consumer.
    pub channel_buffer_size: usize,
}

impl OrchestratorConfig {
    pub const DEFAULT_FETCH_BATCH_SIZE: usize = 100;
    pub const DEFAULT_BULK_BATCH_SIZE: usize = 1000;
    pub const DEFAULT_CHANNEL_BUFFER_SIZE: usize = 4;

    /// Check the sizes the type system cannot.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bulk_batch_size == 0 {
            return Err(PipelineError::config("Bulk batch size must be at least 1"));
        }
        if self.channel_buffer_size == 0 {
            return Err(PipelineError::config("Channel buffer size must be at least 1"));
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: NonZeroUsize::new(Self::DEFAULT_FETCH_BATCH_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            bulk_batch_size: Self::DEFAULT_BULK_BATCH_SIZE,
            channel_buffer_size: Self::DEFAULT_CHANNEL_BUFFER_SIZE,
        }
    }
}

/// Outcome of liberating one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: TableName,
    /// Pages received from the store, empty ones included.
    pub batches_fetched: usize,
    pub records_read: usize,
    pub documents_written: usize,
    pub documents_rejected: usize,
    /// Properties dropped because their type was not recognized.
    pub properties_skipped: usize,
    pub rejections: Vec<DocumentWriteResult>,
    /// Bulk calls made.
    pub bulk_batches: usize,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

/// Orchestrator that coordinates the pipeline components.
///
/// For every table the orchestrator:
/// - Spawns a fetch loop on a background task
/// - Converts the records it streams, in order
/// - Loads the documents in fixed-size bulk writes
/// - Flushes what was converted even when the fetch fails
pub struct Orchestrator {
    store: Arc<dyn TableStore>,
    writer: Arc<dyn BulkWriter>,
    config: OrchestratorConfig,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Create a new orchestrator with the default configuration.
    pub fn new(store: Arc<dyn TableStore>, writer: Arc<dyn BulkWriter>) -> Self {
        Self {
            store,
            writer,
            config: OrchestratorConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        store: Arc<dyn TableStore>,
        writer: Arc<dyn BulkWriter>,
        config: OrchestratorConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            store,
            writer,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops every run of this orchestrator once cancelled.
    ///
    /// No new round trip is started, and the page being converted is
    /// finished; pages still buffered are left unread.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation of the current and all later runs.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Liberate one table.
    ///
    /// # Arguments
    ///
    /// * `table` - The table to copy
    ///
    /// # Returns
    ///
    /// * `Ok(TableSummary)` - The run completed or was cancelled
    /// * `Err(PipelineError)` - The store or the bulk writer failed. Documents
    ///   converted before a store failure have been written.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn run_table(&self, table: &TableName) -> Result<TableSummary, PipelineError> {
        info!("Starting table liberation");

        let mut loader = BulkLoader::new(self.writer.clone(), self.config.bulk_batch_size)?;
        let processor = RecordProcessor::new(table.clone());

        // Child token so a loader failure stops this fetch only.
        let fetch_cancel = self.cancel.child_token();
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let fetcher = TableFetcher::new(
            self.store.clone(),
            table.clone(),
            self.config.fetch_batch_size,
            fetch_cancel.clone(),
        );
        let fetch_handle = tokio::spawn(fetcher.run(tx));

        let mut stream = RecordStream::new(rx, fetch_cancel.clone());
        let mut records_read = 0;
        let mut properties_skipped = 0;
        let mut fetch_error = None;

        while let Some(item) = stream.next().await {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    fetch_error = Some(e);
                    break;
                }
            };

            records_read += 1;
            let processed = processor.process(&record);
            properties_skipped += processed.skipped_properties;

            if let Err(e) = loader.push(processed.document).await {
                error!(error = %e, records_read = records_read, "Loading failed, stopping fetch");
                fetch_cancel.cancel();
                drop(stream);
                let _ = fetch_handle.await;
                return Err(e);
            }
        }
        drop(stream);

        let outcome = fetch_handle
            .await
            .map_err(|e| PipelineError::channel(format!("Fetch task failed: {}", e)))?;

        if let Some(e) = fetch_error {
            warn!(
                error = %e,
                pending = loader.pending_len(),
                "Fetch failed, flushing converted documents"
            );
            if let Err(flush_error) = loader.finish().await {
                error!(error = %flush_error, "Failed to flush converted documents");
            }
            return Err(e);
        }

        let load = loader.finish().await?;
        let cancelled = matches!(outcome, FetchOutcome::Cancelled { .. });

        let summary = TableSummary {
            table: table.clone(),
            batches_fetched: outcome.batches(),
            records_read,
            documents_written: load.documents_written,
            documents_rejected: load.documents_rejected,
            properties_skipped,
            rejections: load.rejections,
            bulk_batches: load.batches_submitted,
            cancelled,
        };

        info!(
            batches = summary.batches_fetched,
            records = summary.records_read,
            written = summary.documents_written,
            rejected = summary.documents_rejected,
            skipped = summary.properties_skipped,
            cancelled = summary.cancelled,
            "Table liberation finished"
        );

        Ok(summary)
    }
}
