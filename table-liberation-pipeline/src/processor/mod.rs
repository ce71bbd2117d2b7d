//! Processor module for the table liberation pipeline.
//!
//! Transforms table records into JSON documents.

mod converter;
mod record_processor;

pub use converter::{
    convert, convert_flat, decode_document_id, document_id, property_to_json, DocumentConverter,
    MAX_SAFE_INTEGER,
};
pub use record_processor::{ProcessedRecord, RecordProcessor};
