//! # Table Liberation
//!
//! Main library for copying the tables of a paged table store into a
//! document database.
//!
//! This crate provides the configuration, logging setup and wiring for
//! running the table liberation pipeline over every table of an account.

pub mod config;
pub mod liberator;
pub mod telemetry;

pub use config::{Dependencies, LiberationConfig};
pub use liberator::Liberator;

use thiserror::Error;

/// Errors that can occur during liberation setup or execution.
#[derive(Error, Debug)]
pub enum LiberationError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] table_liberation_pipeline::PipelineError),

    /// Table store error outside of a table run.
    #[error("Store error: {0}")]
    StoreError(#[from] table_liberation_repository::StoreError),
}

impl LiberationError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
