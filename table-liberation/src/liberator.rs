//! Account-wide liberation: every table, one after the other.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::LiberationError;
use table_liberation_pipeline::orchestrator::{Orchestrator, TableSummary};
use table_liberation_repository::TableStore;

/// Runs the pipeline over every table the store lists, in listing order.
pub struct Liberator {
    store: Arc<dyn TableStore>,
    orchestrator: Orchestrator,
}

impl Liberator {
    pub fn new(store: Arc<dyn TableStore>, orchestrator: Orchestrator) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    /// Token that stops the current table and skips the remaining ones.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.orchestrator.cancel_handle()
    }

    /// Liberate every table.
    ///
    /// The first fatal error aborts the run. A cancelled table ends the run
    /// after its summary is recorded.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<Vec<TableSummary>, LiberationError> {
        let tables = self.store.list_tables().await?;
        info!(tables = tables.len(), "Starting liberation");

        let mut summaries = Vec::with_capacity(tables.len());
        for table in &tables {
            let summary = match self.orchestrator.run_table(table).await {
                Ok(summary) => summary,
                Err(e) => {
                    error!(table = %table, error = %e, "Table liberation failed");
                    return Err(e.into());
                }
            };

            let cancelled = summary.cancelled;
            summaries.push(summary);
            if cancelled {
                info!(table = %table, "Liberation cancelled");
                break;
            }
        }

        info!(
            tables = summaries.len(),
            documents = summaries.iter().map(|s| s.documents_written).sum::<usize>(),
            "Liberation finished"
        );
        Ok(summaries)
    }

    /// Like [`run`](Self::run), but cancels on Ctrl-C.
    pub async fn run_until_shutdown(&self) -> Result<Vec<TableSummary>, LiberationError> {
        let cancel = self.cancel_handle();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received shutdown signal");
                        cancel.cancel();
                    }
                    _ = cancel.cancelled() => {}
                }
            }
        });

        let result = self.run().await;
        watcher.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Dependencies, LiberationConfig};
    use chrono::DateTime;
    use serde_json::json;
    use table_liberation_pipeline::PipelineError;
    use table_liberation_repository::{InMemoryBulkWriter, InMemoryTableStore, StoreError};
    use table_liberation_shared::{TableName, TableRecord};

    fn rows(pk: &str, count: usize) -> Vec<TableRecord> {
        let ts = DateTime::parse_from_rfc3339("2014-03-01T10:00:00+00:00").unwrap();
        (0..count)
            .map(|i| TableRecord::new(pk, i.to_string(), ts, "etag").with_property("N", i as i32))
            .collect()
    }

    fn config() -> LiberationConfig {
        LiberationConfig::from_lookup(|key| match key {
            "FETCH_BATCH_SIZE" => Some("2".to_string()),
            "BULK_BATCH_SIZE" => Some("3".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn liberator(store: InMemoryTableStore, writer: Arc<InMemoryBulkWriter>) -> Liberator {
        Dependencies::with_writer(Arc::new(store), writer, &config())
            .unwrap()
            .liberator
    }

    #[tokio::test]
    async fn test_runs_every_table_in_order() {
        let store = InMemoryTableStore::new()
            .with_table("Orders", rows("A", 3))
            .with_table("Customers", rows("C", 1))
            .with_table("Empty", Vec::new());
        let writer = Arc::new(InMemoryBulkWriter::new());

        let summaries = liberator(store, writer.clone()).run().await.unwrap();
        let tables: Vec<&str> = summaries.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(tables, vec!["Orders", "Customers", "Empty"]);
        assert_eq!(summaries[0].documents_written, 3);
        assert_eq!(summaries[1].documents_written, 1);
        assert_eq!(summaries[2].records_read, 0);

        let stored = writer.stored_documents().await;
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[3]["_id"], json!("Customers-C-0"));
        assert_eq!(stored[3]["AzureMetaData"]["Table"], json!("Customers"));
    }

    #[tokio::test]
    async fn test_first_failure_aborts() {
        let store = InMemoryTableStore::new()
            .with_table("Orders", rows("A", 1))
            .with_table("Customers", rows("C", 1))
            .fail_on_call(1, StoreError::authorization("Signature mismatch"));
        let writer = Arc::new(InMemoryBulkWriter::new());

        let err = liberator(store, writer.clone()).run().await.unwrap_err();
        assert!(matches!(
            err,
            LiberationError::PipelineError(PipelineError::StoreError(
                StoreError::AuthorizationError(_)
            ))
        ));
        assert_eq!(writer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_remaining_tables() {
        let store = InMemoryTableStore::new()
            .with_table("Orders", rows("A", 1))
            .with_table("Customers", rows("C", 1));
        let writer = Arc::new(InMemoryBulkWriter::new());
        let liberator = liberator(store, writer.clone());
        liberator.cancel_handle().cancel();

        let summaries = liberator.run().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].cancelled);
        assert_eq!(summaries[0].table, TableName::from("Orders"));
    }

    #[tokio::test]
    async fn test_couchdb_wiring_accepts_default_url() {
        let store: Arc<dyn TableStore> = Arc::new(InMemoryTableStore::new());
        assert!(Dependencies::new(store, &config()).is_ok());
    }
}
