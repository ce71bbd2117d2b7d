//! Error types for the table liberation repository.

mod bulk_write_error;
mod store_error;

pub use bulk_write_error::BulkWriteError;
pub use store_error::StoreError;
