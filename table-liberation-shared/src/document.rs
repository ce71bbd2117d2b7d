//! The JSON projection of a table record.

use chrono::{DateTime, FixedOffset};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Name of the synthesized id field.
pub const ID_FIELD: &str = "_id";

/// Name of the object holding store-identity metadata.
pub const METADATA_FIELD: &str = "AzureMetaData";

/// Identity of the source row. Every field is always written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    #[serde(rename = "Table")]
    pub table: String,
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
    #[serde(rename = "RowKey")]
    pub row_key: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "ETag")]
    pub etag: String,
}

/// A self-describing document ready for a schema-free document store.
///
/// Serializes as `_id`, then `AzureMetaData`, then the custom fields in the
/// order they were added. Null custom fields never reach a `Document`; a key
/// that is absent means the source row did not carry a value for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    metadata: DocumentMetadata,
    fields: Vec<(String, Value)>,
}

impl Document {
    pub fn new(id: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: id.into(),
            metadata,
            fields: Vec::new(),
        }
    }

    /// Append a custom field.
    pub fn push_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Serialize to the JSON text handed to a bulk writer.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        map.serialize_entry(METADATA_FIELD, &self.metadata)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The plain JSON form of a record: `PartitionKey`, `RowKey`, `Timestamp`,
/// then the custom fields.
///
/// Carries no table name, id or ETag. This is the shape for destinations that
/// assign their own ids; [`Document`] is the shape for ones that need `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDocument {
    partition_key: String,
    row_key: String,
    timestamp: DateTime<FixedOffset>,
    fields: Vec<(String, Value)>,
}

impl FlatDocument {
    pub fn new(
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp,
            fields: Vec::new(),
        }
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for FlatDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry("PartitionKey", &self.partition_key)?;
        map.serialize_entry("RowKey", &self.row_key)?;
        map.serialize_entry("Timestamp", &self.timestamp)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
