//! Settings read from the environment.

use std::num::NonZeroUsize;
use std::str::FromStr;
use url::Url;

use crate::LiberationError;
use table_liberation_pipeline::orchestrator::OrchestratorConfig;

/// Default CouchDB database URL.
const DEFAULT_COUCHDB_URL: &str = "http://localhost:5984/liberated";

/// Settings for a liberation run.
#[derive(Debug, Clone, PartialEq)]
pub struct LiberationConfig {
    /// Rows requested per store round trip.
    pub fetch_batch_size: NonZeroUsize,
    /// Documents per bulk write.
    pub bulk_batch_size: NonZeroUsize,
    /// Pages buffered between the fetch loop and the writer.
    pub channel_buffer_size: NonZeroUsize,
    /// Database that receives the documents.
    pub couchdb_url: Url,
}

impl LiberationConfig {
    /// Load settings from the environment, after reading any `.env` file.
    ///
    /// # Environment Variables
    ///
    /// - `FETCH_BATCH_SIZE`: rows per round trip (default: 100)
    /// - `BULK_BATCH_SIZE`: documents per bulk write (default: 1000)
    /// - `CHANNEL_BUFFER_SIZE`: pages buffered ahead of the writer (default: 4)
    /// - `COUCHDB_URL`: target database (default: http://localhost:5984/liberated)
    pub fn from_env() -> Result<Self, LiberationError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LiberationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch_batch_size = size_var(
            &lookup,
            "FETCH_BATCH_SIZE",
            OrchestratorConfig::DEFAULT_FETCH_BATCH_SIZE,
        )?;
        let bulk_batch_size = size_var(
            &lookup,
            "BULK_BATCH_SIZE",
            OrchestratorConfig::DEFAULT_BULK_BATCH_SIZE,
        )?;
        let channel_buffer_size = size_var(
            &lookup,
            "CHANNEL_BUFFER_SIZE",
            OrchestratorConfig::DEFAULT_CHANNEL_BUFFER_SIZE,
        )?;

        let raw_url = lookup("COUCHDB_URL").unwrap_or_else(|| DEFAULT_COUCHDB_URL.to_string());
        let couchdb_url = Url::parse(&raw_url).map_err(|e| {
            LiberationError::config(format!("Invalid COUCHDB_URL {}: {}", raw_url, e))
        })?;

        Ok(Self {
            fetch_batch_size,
            bulk_batch_size,
            channel_buffer_size,
            couchdb_url,
        })
    }

    /// The pipeline settings for one table run.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            fetch_batch_size: self.fetch_batch_size,
            bulk_batch_size: self.bulk_batch_size.get(),
            channel_buffer_size: self.channel_buffer_size.get(),
        }
    }
}

fn size_var<F>(lookup: &F, key: &str, default: usize) -> Result<NonZeroUsize, LiberationError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match lookup(key) {
        Some(raw) => raw,
        None => default.to_string(),
    };
    NonZeroUsize::from_str(raw.trim()).map_err(|_| {
        LiberationError::config(format!("{} must be a positive integer, got {:?}", key, raw))
    })
}
