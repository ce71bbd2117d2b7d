//! # Table Liberation Repository
//!
//! This crate provides the traits the pipeline uses to talk to the outside
//! world: a paged [`TableStore`] to read rows from and a [`BulkWriter`] to hand
//! documents to. It includes error definitions for both sides, an in-memory
//! implementation of each, and a CouchDB bulk writer.

pub mod couchdb;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod types;

pub use couchdb::CouchDbBulkWriter;
pub use errors::{BulkWriteError, StoreError};
pub use interfaces::{BulkWriter, TableStore};
pub use memory::{FetchCall, InMemoryBulkWriter, InMemoryTableStore};
pub use types::{BulkWriteReport, DocumentWriteResult};
