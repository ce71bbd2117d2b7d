//! Typed property values carried by table records.
//!
//! The remote store tags every custom property with one of a closed set of
//! entity data model types. Each value may be null independently of its type,
//! so every variant wraps an `Option`: `String(None)` is a null string while
//! `String(Some(String::new()))` is a present, empty one.

use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// The closed set of property types understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmType {
    String,
    Boolean,
    DateTime,
    Double,
    Guid,
    Int32,
    Int64,
    Binary,
}

impl EdmType {
    /// All known types, in declaration order.
    pub const ALL: [EdmType; 8] = [
        EdmType::String,
        EdmType::Boolean,
        EdmType::DateTime,
        EdmType::Double,
        EdmType::Guid,
        EdmType::Int32,
        EdmType::Int64,
        EdmType::Binary,
    ];

    /// The wire name of the type, e.g. `Edm.Int64`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdmType::String => "Edm.String",
            EdmType::Boolean => "Edm.Boolean",
            EdmType::DateTime => "Edm.DateTime",
            EdmType::Double => "Edm.Double",
            EdmType::Guid => "Edm.Guid",
            EdmType::Int32 => "Edm.Int32",
            EdmType::Int64 => "Edm.Int64",
            EdmType::Binary => "Edm.Binary",
        }
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type tag outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown property type: {0}")]
pub struct UnknownEdmType(pub String);

impl FromStr for EdmType {
    type Err = UnknownEdmType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdmType::ALL
            .into_iter()
            .find(|edm| edm.as_str() == s)
            .ok_or_else(|| UnknownEdmType(s.to_string()))
    }
}

/// The value of one custom property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(Option<String>),
    Boolean(Option<bool>),
    DateTime(Option<DateTime<FixedOffset>>),
    Double(Option<f64>),
    Guid(Option<Uuid>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Binary(Option<Vec<u8>>),
    /// A property whose type tag is not in [`EdmType`]. Its payload is not
    /// interpreted.
    Unrecognized { type_tag: String },
}

impl PropertyValue {
    /// A null value of the given type.
    pub fn null(edm_type: EdmType) -> Self {
        match edm_type {
            EdmType::String => PropertyValue::String(None),
            EdmType::Boolean => PropertyValue::Boolean(None),
            EdmType::DateTime => PropertyValue::DateTime(None),
            EdmType::Double => PropertyValue::Double(None),
            EdmType::Guid => PropertyValue::Guid(None),
            EdmType::Int32 => PropertyValue::Int32(None),
            EdmType::Int64 => PropertyValue::Int64(None),
            EdmType::Binary => PropertyValue::Binary(None),
        }
    }

    /// An unrecognized value carrying its original type tag.
    pub fn unrecognized(type_tag: impl Into<String>) -> Self {
        PropertyValue::Unrecognized {
            type_tag: type_tag.into(),
        }
    }

    /// The known type of this value, or `None` when unrecognized.
    pub fn edm_type(&self) -> Option<EdmType> {
        match self {
            PropertyValue::String(_) => Some(EdmType::String),
            PropertyValue::Boolean(_) => Some(EdmType::Boolean),
            PropertyValue::DateTime(_) => Some(EdmType::DateTime),
            PropertyValue::Double(_) => Some(EdmType::Double),
            PropertyValue::Guid(_) => Some(EdmType::Guid),
            PropertyValue::Int32(_) => Some(EdmType::Int32),
            PropertyValue::Int64(_) => Some(EdmType::Int64),
            PropertyValue::Binary(_) => Some(EdmType::Binary),
            PropertyValue::Unrecognized { .. } => None,
        }
    }

    /// The type tag as it appeared on the wire.
    pub fn type_tag(&self) -> &str {
        match self {
            PropertyValue::Unrecognized { type_tag } => type_tag.as_str(),
            known => known.edm_type().map(|edm| edm.as_str()).unwrap_or_default(),
        }
    }

    /// Whether the value is a typed null. Unrecognized values are never null;
    /// their payload is simply unknown.
    pub fn is_null(&self) -> bool {
        match self {
            PropertyValue::String(v) => v.is_none(),
            PropertyValue::Boolean(v) => v.is_none(),
            PropertyValue::DateTime(v) => v.is_none(),
            PropertyValue::Double(v) => v.is_none(),
            PropertyValue::Guid(v) => v.is_none(),
            PropertyValue::Int32(v) => v.is_none(),
            PropertyValue::Int64(v) => v.is_none(),
            PropertyValue::Binary(v) => v.is_none(),
            PropertyValue::Unrecognized { .. } => false,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(Some(v))
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(Some(v.to_string()))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(Some(v))
    }
}

impl From<DateTime<FixedOffset>> for PropertyValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        PropertyValue::DateTime(Some(v))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(Some(v))
    }
}

impl From<Uuid> for PropertyValue {
    fn from(v: Uuid) -> Self {
        PropertyValue::Guid(Some(v))
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int32(Some(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int64(Some(v))
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(v: Vec<u8>) -> Self {
        PropertyValue::Binary(Some(v))
    }
}
