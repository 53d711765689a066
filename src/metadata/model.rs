//! Modelos compartidos para devolver metadata de manera uniforme.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Mapeo de nombre de campo a valor, propio de cada llamada de extracción.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Valor de un campo de metadata. La forma depende del extractor que lo produjo.
#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    List(Vec<MetadataValue>),
    Map(Metadata),
    Null,
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MetadataValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Metadata> {
        match self {
            MetadataValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Texto legible del valor: cadenas tal cual y bytes como UTF-8 con pérdida.
    pub fn display_text(&self) -> Option<String> {
        match self {
            MetadataValue::Text(text) => Some(text.clone()),
            MetadataValue::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for MetadataValue {
    fn from(value: Vec<u8>) -> Self {
        MetadataValue::Bytes(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Boolean(value)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(value: Metadata) -> Self {
        MetadataValue::Map(value)
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Text(text) => serializer.serialize_str(text),
            MetadataValue::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            MetadataValue::Integer(value) => serializer.serialize_i64(*value),
            MetadataValue::Real(value) => serializer.serialize_f64(*value),
            MetadataValue::Boolean(value) => serializer.serialize_bool(*value),
            MetadataValue::Timestamp(time) => serializer.serialize_str(&time.to_rfc3339()),
            MetadataValue::List(items) => items.serialize(serializer),
            MetadataValue::Map(map) => map.serialize(serializer),
            MetadataValue::Null => serializer.serialize_unit(),
        }
    }
}
