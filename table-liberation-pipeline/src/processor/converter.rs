//! Conversion of table records into JSON documents.
//!
//! Conversion is a pure function of the table name and the record. Ids are
//! synthesized as `table-partitionKey-rowKey`, with `%` and `-` percent-escaped
//! inside each component so that distinct keys never map to the same id.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Number, Value};

use table_liberation_shared::{
    Document, DocumentMetadata, FlatDocument, PropertyValue, TableName, TableRecord,
};

/// Separator between id components.
const ID_SEPARATOR: char = '-';

/// Largest integer a double-precision JSON consumer represents exactly.
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Converts the records of one table into documents.
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    table: TableName,
}

impl DocumentConverter {
    pub fn new(table: TableName) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Convert a record into its document.
    ///
    /// Custom fields keep the record's order. Null values and values of an
    /// unrecognized type produce no key at all.
    pub fn convert(&self, record: &TableRecord) -> Document {
        convert(&self.table, record)
    }
}

/// Convert a record of `table` into its document.
pub fn convert(table: &TableName, record: &TableRecord) -> Document {
    let metadata = DocumentMetadata {
        table: table.as_str().to_string(),
        partition_key: record.partition_key().to_string(),
        row_key: record.row_key().to_string(),
        timestamp: record.timestamp(),
        etag: record.etag().to_string(),
    };

    let mut document = Document::new(
        document_id(table, record.partition_key(), record.row_key()),
        metadata,
    );

    for (name, json) in present_fields(record) {
        document.push_field(name, json);
    }

    document
}

/// Convert a record into its plain form, without id or store metadata.
///
/// Custom fields follow the same rules as [`convert`].
pub fn convert_flat(record: &TableRecord) -> FlatDocument {
    let mut document =
        FlatDocument::new(record.partition_key(), record.row_key(), record.timestamp());
    for (name, json) in present_fields(record) {
        document.push_field(name, json);
    }
    document
}

fn present_fields(record: &TableRecord) -> impl Iterator<Item = (&str, Value)> {
    record
        .properties()
        .iter()
        .filter_map(|(name, value)| property_to_json(value).map(|json| (name.as_str(), json)))
}

/// The id of the document for `(table, partition_key, row_key)`.
pub fn document_id(table: &TableName, partition_key: &str, row_key: &str) -> String {
    [table.as_str(), partition_key, row_key]
        .iter()
        .map(|component| escape_component(component))
        .collect::<Vec<_>>()
        .join("-")
}

/// Split an id produced by [`document_id`] back into its components.
///
/// Returns `None` for strings that no call to `document_id` can produce.
pub fn decode_document_id(id: &str) -> Option<(String, String, String)> {
    let mut parts = id.split(ID_SEPARATOR);
    let table = unescape_component(parts.next()?)?;
    let partition_key = unescape_component(parts.next()?)?;
    let row_key = unescape_component(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((table, partition_key, row_key))
}

fn escape_component(component: &str) -> String {
    component.replace('%', "%25").replace(ID_SEPARATOR, "%2D")
}

fn unescape_component(component: &str) -> Option<String> {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match (chars.next()?, chars.next()?) {
            ('2', '5') => out.push('%'),
            ('2', 'D') => out.push(ID_SEPARATOR),
            _ => return None,
        }
    }
    Some(out)
}

/// The JSON form of a property value, or `None` when the key must be omitted.
pub fn property_to_json(value: &PropertyValue) -> Option<Value> {
    match value {
        PropertyValue::String(v) => v.as_ref().map(|s| Value::String(s.clone())),
        PropertyValue::Boolean(v) => v.map(Value::Bool),
        PropertyValue::DateTime(v) => v.map(|dt| Value::String(dt.to_rfc3339())),
        PropertyValue::Double(v) => v.map(double_to_json),
        PropertyValue::Guid(v) => v.map(|id| Value::String(id.hyphenated().to_string())),
        PropertyValue::Int32(v) => v.map(Value::from),
        PropertyValue::Int64(v) => v.map(int64_to_json),
        PropertyValue::Binary(v) => v.as_ref().map(|bytes| Value::String(STANDARD.encode(bytes))),
        PropertyValue::Unrecognized { .. } => None,
    }
}

fn double_to_json(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None if v.is_nan() => Value::String("NaN".to_string()),
        None if v > 0.0 => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}

fn int64_to_json(v: i64) -> Value {
    if v.unsigned_abs() <= MAX_SAFE_INTEGER {
        Value::from(v)
    } else {
        Value::String(v.to_string())
    }
}
