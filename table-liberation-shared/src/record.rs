//! Table records and the pages they arrive in.

use chrono::{DateTime, FixedOffset};

use crate::property::PropertyValue;
use crate::table::ContinuationToken;

/// One row of a remote table.
///
/// Rows are schema-free: apart from the identity fields every row carries its
/// own ordered set of typed properties. The partition key and row key together
/// with the table name identify the row for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRecord {
    partition_key: String,
    row_key: String,
    timestamp: DateTime<FixedOffset>,
    etag: String,
    properties: Vec<(String, PropertyValue)>,
}

impl TableRecord {
    /// Create a record with its identity fields and no custom properties.
    pub fn new(
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        etag: impl Into<String>,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp,
            etag: etag.into(),
            properties: Vec::new(),
        }
    }

    /// Add a custom property. A property with the same name is replaced in
    /// place, keeping its original position.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
        self
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    /// Last-modified time reported by the store.
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Optimistic-concurrency tag reported by the store.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// Custom properties in the order the store returned them.
    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    /// Look up a custom property by exact name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Properties whose type tag is outside the known set.
    pub fn unrecognized_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().filter_map(|(name, value)| match value {
            PropertyValue::Unrecognized { type_tag } => Some((name.as_str(), type_tag.as_str())),
            _ => None,
        })
    }
}

/// One page of records plus the token needed to fetch the page after it.
///
/// A batch may legally be empty while still carrying a token; only a missing
/// token marks the end of the table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordBatch {
    records: Vec<TableRecord>,
    next_token: Option<ContinuationToken>,
}

impl RecordBatch {
    pub fn new(records: Vec<TableRecord>, next_token: Option<ContinuationToken>) -> Self {
        Self {
            records,
            next_token,
        }
    }

    /// The last page of a table.
    pub fn last(records: Vec<TableRecord>) -> Self {
        Self::new(records, None)
    }

    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }

    pub fn next_token(&self) -> Option<&ContinuationToken> {
        self.next_token.as_ref()
    }

    /// Whether this page ends pagination.
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split the batch into its records and its token.
    pub fn into_parts(self) -> (Vec<TableRecord>, Option<ContinuationToken>) {
        (self.records, self.next_token)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableRecord> {
        self.records.iter()
    }
}

impl IntoIterator for RecordBatch {
    type Item = TableRecord;
    type IntoIter = std::vec::IntoIter<TableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a TableRecord;
    type IntoIter = std::slice::Iter<'a, TableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::EdmType;
    use chrono::DateTime;

    fn timestamp() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2014-03-01T10:00:00+00:00").unwrap()
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let record = TableRecord::new("A", "1", timestamp(), "W/\"1\"")
            .with_property("Zeta", 1i32)
            .with_property("Alpha", "x")
            .with_property("Mid", PropertyValue::null(EdmType::Double));

        let names: Vec<&str> = record.properties().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_with_property_replaces_in_place() {
        let record = TableRecord::new("A", "1", timestamp(), "etag")
            .with_property("Amount", 1.0)
            .with_property("Note", "n")
            .with_property("Amount", 2.5);

        assert_eq!(record.properties().len(), 2);
        assert_eq!(record.properties()[0].0, "Amount");
        assert_eq!(record.property("Amount"), Some(&PropertyValue::Double(Some(2.5))));
    }

    #[test]
    fn test_unrecognized_properties() {
        let record = TableRecord::new("A", "1", timestamp(), "etag")
            .with_property("Known", true)
            .with_property("Odd", PropertyValue::unrecognized("Edm.Decimal"));

        let odd: Vec<(&str, &str)> = record.unrecognized_properties().collect();
        assert_eq!(odd, vec![("Odd", "Edm.Decimal")]);
    }

    #[test]
    fn test_batch_flattens_in_order() {
        let batch = RecordBatch::new(
            vec![
                TableRecord::new("A", "1", timestamp(), "e1"),
                TableRecord::new("A", "2", timestamp(), "e2"),
            ],
            Some(ContinuationToken::new("next")),
        );

        assert!(!batch.is_last());
        assert_eq!(batch.len(), 2);

        let keys: Vec<String> = batch.into_iter().map(|r| r.row_key().to_string()).collect();
        assert_eq!(keys, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_batch_with_token_is_not_last() {
        let batch = RecordBatch::new(Vec::new(), Some(ContinuationToken::new("more")));
        assert!(batch.is_empty());
        assert!(!batch.is_last());
        assert!(RecordBatch::last(Vec::new()).is_last());
    }
}
