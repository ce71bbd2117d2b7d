//! # Table Liberation Pipeline
//!
//! This crate provides the pipeline that streams rows out of a paged table
//! store and bulk-writes them into a document store as JSON documents.
//!
//! ## Architecture
//!
//! The pipeline follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: A background fetch loop pages through the table, one
//!    continuation token at a time, and hands batches over a bounded channel;
//!    a record stream flattens them into individual records
//! 2. **Processor**: Converts each record into a JSON document
//! 3. **Loader**: Regroups documents into fixed-size bulk writes
//! 4. **Orchestrator**: Coordinates the pipeline flow for one table

pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use errors::PipelineError;
