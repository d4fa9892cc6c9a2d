//! Cell values shared by numeric and structured cubes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// A structured cell: field name to nested JSON value.
pub type Record = Map<String, JsonValue>;

/// Value kind a cube stores, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeKind {
    Numeric,
    Structured,
}

impl CubeKind {
    /// Type tag used by the document codec.
    pub fn as_str(&self) -> &'static str {
        match self {
            CubeKind::Numeric => "numeric",
            CubeKind::Structured => "structured",
        }
    }

    /// Parse a document type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "numeric" => Some(CubeKind::Numeric),
            "structured" => Some(CubeKind::Structured),
            _ => None,
        }
    }
}

impl fmt::Display for CubeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stored cell.
///
/// Serializes untagged so documents carry a bare number or a bare object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Record(Record),
}

impl Value {
    pub fn kind(&self) -> CubeKind {
        match self {
            Value::Number(_) => CubeKind::Numeric,
            Value::Record(_) => CubeKind::Structured,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            Value::Number(_) => None,
        }
    }

    /// Numeric field of a record, for use as an aggregation extractor.
    pub fn field_number(&self, field: &str) -> Option<f64> {
        self.as_record()?.get(field)?.as_f64()
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = crate::error::CubeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
                crate::error::CubeError::Serialization(format!("number {} out of range", n))
            }),
            JsonValue::Object(map) => Ok(Value::Record(map)),
            other => Err(crate::error::CubeError::Serialization(format!(
                "cell value must be a number or an object, got {}",
                other
            ))),
        }
    }
}
