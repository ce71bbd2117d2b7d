//! Loader module for the table liberation pipeline.
//!
//! Batches converted documents and writes them to the destination.

mod batcher;
mod bulk_loader;

pub use batcher::{BulkBatcher, BulkWriteBatch};
pub use bulk_loader::{BulkLoader, LoadSummary};
