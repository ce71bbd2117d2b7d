//! Processing stage between the record stream and the loader.

use tracing::warn;

use crate::processor::converter::DocumentConverter;
use table_liberation_shared::{Document, TableName, TableRecord};

/// A converted record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub document: Document,
    /// Properties dropped because their type was not recognized.
    pub skipped_properties: usize,
}

/// Converts records and reports what the conversion dropped.
///
/// The converter itself silently drops properties of unknown type; this
/// stage logs each of them so that no data disappears unnoticed.
#[derive(Debug, Clone)]
pub struct RecordProcessor {
    converter: DocumentConverter,
}

impl RecordProcessor {
    pub fn new(table: TableName) -> Self {
        Self {
            converter: DocumentConverter::new(table),
        }
    }

    pub fn process(&self, record: &TableRecord) -> ProcessedRecord {
        let document = self.converter.convert(record);

        let mut skipped_properties = 0;
        for (name, type_tag) in record.unrecognized_properties() {
            warn!(
                table = %self.converter.table(),
                id = %document.id(),
                property = %name,
                type_tag = %type_tag,
                "Dropping property of unrecognized type"
            );
            skipped_properties += 1;
        }

        ProcessedRecord {
            document,
            skipped_properties,
        }
    }
}
