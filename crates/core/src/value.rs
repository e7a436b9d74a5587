//! Decoded values and map keys.

#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

use crate::Message;

/// A single decoded value. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value by number; symbol resolution lives with the schema.
    Enum(i32),
    Message(Box<Message>),
    WellKnown(WellKnown),
}

impl Value {
    /// Short variant name, used in diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
            Value::WellKnown(_) => "well_known",
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Synthetic nested message produced for a well-known composite type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WellKnown {
    Timestamp { seconds: i64, nanos: i32 },
    Duration { seconds: i64, nanos: i32 },
    /// Boxed scalar; the inner variant identifies the wrapper type.
    Wrapper(Box<Value>),
    FieldMask { paths: Vec<String> },
    /// Generic structured object. Numbers are held as doubles.
    Struct(serde_json::Map<String, serde_json::Value>),
    /// Generic structured value. Numbers are held as doubles.
    Value(serde_json::Value),
}

/// Key of a map entry. Only integral, bool and string kinds may key a map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} values cannot key a map")]
pub struct InvalidMapKey(pub &'static str);

impl TryFrom<Value> for MapKey {
    type Error = InvalidMapKey;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Bool(b) => Ok(MapKey::Bool(b)),
            Value::I32(n) => Ok(MapKey::I32(n)),
            Value::I64(n) => Ok(MapKey::I64(n)),
            Value::U32(n) => Ok(MapKey::U32(n)),
            Value::U64(n) => Ok(MapKey::U64(n)),
            Value::String(s) => Ok(MapKey::String(s)),
            other => Err(InvalidMapKey(other.variant_name())),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{b}"),
            MapKey::I32(n) => write!(f, "{n}"),
            MapKey::I64(n) => write!(f, "{n}"),
            MapKey::U32(n) => write!(f, "{n}"),
            MapKey::U64(n) => write!(f, "{n}"),
            MapKey::String(s) => f.write_str(s),
        }
    }
}
