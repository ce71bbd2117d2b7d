//! # Table Liberation Shared
//!
//! Shared types for the table liberation workspace: the identity of a remote
//! table, the records it pages back, and the JSON documents produced from them.

pub mod document;
pub mod property;
pub mod record;
pub mod table;

pub use document::{Document, DocumentMetadata, FlatDocument, ID_FIELD, METADATA_FIELD};
pub use property::{EdmType, PropertyValue, UnknownEdmType};
pub use record::{RecordBatch, TableRecord};
pub use table::{ContinuationToken, TableName};
