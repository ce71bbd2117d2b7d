//! CouchDB implementation of the bulk writer.
//!
//! Documents are posted in one request to the database's `_bulk_docs`
//! endpoint, which answers with one row per document.

mod client;

pub use client::CouchDbBulkWriter;
