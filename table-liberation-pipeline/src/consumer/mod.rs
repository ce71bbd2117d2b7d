//! Consumer module for the table liberation pipeline.
//!
//! Provides the fetch loop that pages through a table and the record stream
//! that flattens its batches into individual records.

mod fetcher;
mod messages;
mod record_stream;

pub use fetcher::TableFetcher;
pub use messages::{FetchMessage, FetchOutcome, FetchState};
pub use record_stream::RecordStream;
