#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bool,
    Int32,
    Sint32,
    Sfixed32,
    Int64,
    Sint64,
    Sfixed64,
    Uint32,
    Fixed32,
    Uint64,
    Fixed64,
    Float,
    Double,
    String,
    Bytes,
    Enum,
    Message,
    Group,
}

impl Kind {
    /// Kinds that refer to another named type.
    pub fn needs_type_name(self) -> bool {
        matches!(self, Kind::Enum | Kind::Message | Kind::Group)
    }

    pub fn is_message(self) -> bool {
        matches!(self, Kind::Message | Kind::Group)
    }

    /// Map keys are restricted to integral, bool and string kinds.
    pub fn can_key_map(self) -> bool {
        !matches!(self, Kind::Float | Kind::Double | Kind::Bytes | Kind::Enum | Kind::Message | Kind::Group)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int32 => "int32",
            Kind::Sint32 => "sint32",
            Kind::Sfixed32 => "sfixed32",
            Kind::Int64 => "int64",
            Kind::Sint64 => "sint64",
            Kind::Sfixed64 => "sfixed64",
            Kind::Uint32 => "uint32",
            Kind::Fixed32 => "fixed32",
            Kind::Uint64 => "uint64",
            Kind::Fixed64 => "fixed64",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Enum => "enum",
            Kind::Message => "message",
            Kind::Group => "group",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind plus the referenced type for enum and message kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
    pub kind: Kind,
    pub type_name: Option<String>,
}

impl FieldType {
    pub fn scalar(kind: Kind) -> Self {
        Self { kind, type_name: None }
    }

    pub fn enumeration(type_name: impl Into<String>) -> Self {
        Self { kind: Kind::Enum, type_name: Some(type_name.into()) }
    }

    pub fn message(type_name: impl Into<String>) -> Self {
        Self { kind: Kind::Message, type_name: Some(type_name.into()) }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Singular,
    Repeated,
    /// Map keyed by the given kind; the field type describes the value.
    Map(Kind),
}

/// Identity of the fixed set of well-known composite types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WellKnownType {
    Timestamp,
    Duration,
    DoubleValue,
    FloatValue,
    Int64Value,
    Int32Value,
    UInt64Value,
    UInt32Value,
    BoolValue,
    StringValue,
    BytesValue,
    FieldMask,
    Value,
    Struct,
}

impl WellKnownType {
    pub const ALL: [WellKnownType; 14] = [
        WellKnownType::Timestamp,
        WellKnownType::Duration,
        WellKnownType::DoubleValue,
        WellKnownType::FloatValue,
        WellKnownType::Int64Value,
        WellKnownType::Int32Value,
        WellKnownType::UInt64Value,
        WellKnownType::UInt32Value,
        WellKnownType::BoolValue,
        WellKnownType::StringValue,
        WellKnownType::BytesValue,
        WellKnownType::FieldMask,
        WellKnownType::Value,
        WellKnownType::Struct,
    ];

    pub fn from_full_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.full_name() == name)
    }

    pub fn full_name(self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "google.protobuf.Timestamp",
            WellKnownType::Duration => "google.protobuf.Duration",
            WellKnownType::DoubleValue => "google.protobuf.DoubleValue",
            WellKnownType::FloatValue => "google.protobuf.FloatValue",
            WellKnownType::Int64Value => "google.protobuf.Int64Value",
            WellKnownType::Int32Value => "google.protobuf.Int32Value",
            WellKnownType::UInt64Value => "google.protobuf.UInt64Value",
            WellKnownType::UInt32Value => "google.protobuf.UInt32Value",
            WellKnownType::BoolValue => "google.protobuf.BoolValue",
            WellKnownType::StringValue => "google.protobuf.StringValue",
            WellKnownType::BytesValue => "google.protobuf.BytesValue",
            WellKnownType::FieldMask => "google.protobuf.FieldMask",
            WellKnownType::Value => "google.protobuf.Value",
            WellKnownType::Struct => "google.protobuf.Struct",
        }
    }

    /// Scalar kind boxed by a wrapper type.
    pub fn wrapped_kind(self) -> Option<Kind> {
        match self {
            WellKnownType::DoubleValue => Some(Kind::Double),
            WellKnownType::FloatValue => Some(Kind::Float),
            WellKnownType::Int64Value => Some(Kind::Int64),
            WellKnownType::Int32Value => Some(Kind::Int32),
            WellKnownType::UInt64Value => Some(Kind::Uint64),
            WellKnownType::UInt32Value => Some(Kind::Uint32),
            WellKnownType::BoolValue => Some(Kind::Bool),
            WellKnownType::StringValue => Some(Kind::String),
            WellKnownType::BytesValue => Some(Kind::Bytes),
            _ => None,
        }
    }
}

/// Default alternate name: lowerCamelCase of the declared name.
pub fn json_name_of(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_name_camel_cases() {
        assert_eq!(json_name_of("page_size"), "pageSize");
        assert_eq!(json_name_of("created_after_ts"), "createdAfterTs");
        assert_eq!(json_name_of("name"), "name");
        assert_eq!(json_name_of("a__b"), "aB");
    }

    #[test]
    fn well_known_names_resolve() {
        for w in WellKnownType::ALL {
            assert_eq!(WellKnownType::from_full_name(w.full_name()), Some(w));
        }
        assert_eq!(WellKnownType::from_full_name("google.protobuf.ListValue"), None);
        assert_eq!(WellKnownType::UInt32Value.wrapped_kind(), Some(Kind::Uint32));
        assert_eq!(WellKnownType::FieldMask.wrapped_kind(), None);
    }

    #[test]
    fn map_key_kinds() {
        assert!(Kind::String.can_key_map());
        assert!(Kind::Sfixed64.can_key_map());
        assert!(!Kind::Double.can_key_map());
        assert!(!Kind::Enum.can_key_map());
    }
}
