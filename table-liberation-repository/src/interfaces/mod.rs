//! Interface definitions for the table store and the bulk writer.
//!
//! Both traits allow the pipeline to be driven against any backend, including
//! the in-memory ones used in tests.

mod bulk_writer;
mod table_store;

pub use bulk_writer::BulkWriter;
pub use table_store::TableStore;
