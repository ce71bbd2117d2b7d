//! Dependency initialization and wiring for table liberation.

use std::sync::Arc;
use tracing::info;

use crate::config::LiberationConfig;
use crate::liberator::Liberator;
use crate::LiberationError;
use table_liberation_pipeline::orchestrator::Orchestrator;
use table_liberation_repository::{BulkWriter, CouchDbBulkWriter, TableStore};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured liberator ready to run.
    pub liberator: Liberator,
}

impl Dependencies {
    /// Wire a liberator that reads from `store` and writes to the configured
    /// CouchDB database.
    ///
    /// # Arguments
    ///
    /// * `store` - The table store to copy
    /// * `config` - Settings, usually from [`LiberationConfig::from_env`]
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(LiberationError)` - If the configuration is unusable
    pub fn new(
        store: Arc<dyn TableStore>,
        config: &LiberationConfig,
    ) -> Result<Self, LiberationError> {
        info!(
            couchdb_url = %config.couchdb_url,
            fetch_batch_size = config.fetch_batch_size.get(),
            bulk_batch_size = config.bulk_batch_size.get(),
            "Initializing dependencies"
        );

        let writer = CouchDbBulkWriter::new(config.couchdb_url.as_str()).map_err(|e| {
            LiberationError::config(format!("Failed to create CouchDB writer: {}", e))
        })?;

        Self::with_writer(store, Arc::new(writer), config)
    }

    /// Wire a liberator around an explicit bulk writer.
    pub fn with_writer(
        store: Arc<dyn TableStore>,
        writer: Arc<dyn BulkWriter>,
        config: &LiberationConfig,
    ) -> Result<Self, LiberationError> {
        let orchestrator =
            Orchestrator::with_config(store.clone(), writer, config.orchestrator_config())?;

        Ok(Self {
            liberator: Liberator::new(store, orchestrator),
        })
    }
}
