//! In-memory implementations of the repository interfaces.
//!
//! These back the pipeline's tests and are handy for dry runs: the table store
//! pages through rows held in memory, and the bulk writer keeps whatever it is
//! sent. Both can be told to fail on a given call.

mod bulk_writer;
mod table_store;

pub use bulk_writer::InMemoryBulkWriter;
pub use table_store::{FetchCall, InMemoryTableStore};
