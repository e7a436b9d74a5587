//! Decode errors. Every variant is a deterministic, input-dependent failure; the
//! decode stops at the first one.

#![forbid(unsafe_code)]

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

use qbind_core::InvalidMapKey;
use serde::{Deserialize, Serialize};

/// Primitive parse failure underneath a [`DecodeError::Coercion`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalarError {
    #[error("invalid bool {0:?}")]
    Bool(String),
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    #[error("invalid syntax {0:?}")]
    Syntax(String),
    #[error("value {0:?} out of range")]
    Range(String),
    #[error(transparent)]
    Bytes(#[from] base64::DecodeError),
    #[error(transparent)]
    MapKey(#[from] InvalidMapKey),
    #[error("{0} is not a scalar kind")]
    NotScalar(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPart {
    Key,
    Value,
}

impl fmt::Display for MapPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MapPart::Key => "key",
            MapPart::Value => "value",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no field path")]
    EmptyPath,
    #[error("no value provided for {path:?}")]
    NoValue { path: String },
    #[error("invalid path {path:?}: {reason}")]
    UnsupportedPath { path: String, reason: String },
    #[error("field {field:?} conflicts with {existing:?}: oneof {oneof:?} already set")]
    OneofConflict { oneof: String, field: String, existing: String },
    #[error("too many values for field {field:?}: {}", .values.join(", "))]
    TooManyValues { field: String, values: Vec<String> },
    #[error("map {field:?} needs exactly one key and one value, got {count} values")]
    MapArity { field: String, count: usize },
    #[error("parsing field {field:?}: {source}")]
    Coercion { field: String, source: ScalarError },
    #[error("parsing list {field:?} element {index}: {source}")]
    ListElement { field: String, index: usize, source: Box<DecodeError> },
    #[error("parsing map {part} of {field:?}: {source}")]
    MapEntry { field: String, part: MapPart, source: Box<DecodeError> },
    #[error("field {field:?}: {value:?} is not a valid value of {enum_name:?}")]
    InvalidEnumValue { field: String, enum_name: String, value: String },
    #[error("field {field:?}: enum {enum_name:?} is not registered")]
    EnumNotRegistered { field: String, enum_name: String },
    #[error("field {field:?}: invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { field: String, value: String, reason: String },
    #[error("field {field:?}: invalid duration {value:?}: {reason}")]
    InvalidDuration { field: String, value: String, reason: String },
    #[error("field {field:?}: invalid structured value: {reason}")]
    InvalidStructuredValue { field: String, reason: String },
    #[error("field {field:?}: unsupported message type {type_name:?}")]
    UnsupportedMessageType { field: String, type_name: String },
    #[error("message type {0:?} is not registered")]
    UnknownMessageType(String),
}

/// Discriminant of [`DecodeError`], for callers and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyPath,
    NoValue,
    UnsupportedPath,
    OneofConflict,
    TooManyValues,
    MapArity,
    Coercion,
    ListElement,
    MapEntry,
    InvalidEnumValue,
    EnumNotRegistered,
    InvalidTimestamp,
    InvalidDuration,
    InvalidStructuredValue,
    UnsupportedMessageType,
    UnknownMessageType,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::EmptyPath => "empty_path",
            ErrorKind::NoValue => "no_value",
            ErrorKind::UnsupportedPath => "unsupported_path",
            ErrorKind::OneofConflict => "oneof_conflict",
            ErrorKind::TooManyValues => "too_many_values",
            ErrorKind::MapArity => "map_arity",
            ErrorKind::Coercion => "coercion",
            ErrorKind::ListElement => "list_element",
            ErrorKind::MapEntry => "map_entry",
            ErrorKind::InvalidEnumValue => "invalid_enum_value",
            ErrorKind::EnumNotRegistered => "enum_not_registered",
            ErrorKind::InvalidTimestamp => "invalid_timestamp",
            ErrorKind::InvalidDuration => "invalid_duration",
            ErrorKind::InvalidStructuredValue => "invalid_structured_value",
            ErrorKind::UnsupportedMessageType => "unsupported_message_type",
            ErrorKind::UnknownMessageType => "unknown_message_type",
        }
    }
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::EmptyPath => ErrorKind::EmptyPath,
            DecodeError::NoValue { .. } => ErrorKind::NoValue,
            DecodeError::UnsupportedPath { .. } => ErrorKind::UnsupportedPath,
            DecodeError::OneofConflict { .. } => ErrorKind::OneofConflict,
            DecodeError::TooManyValues { .. } => ErrorKind::TooManyValues,
            DecodeError::MapArity { .. } => ErrorKind::MapArity,
            DecodeError::Coercion { .. } => ErrorKind::Coercion,
            DecodeError::ListElement { .. } => ErrorKind::ListElement,
            DecodeError::MapEntry { .. } => ErrorKind::MapEntry,
            DecodeError::InvalidEnumValue { .. } => ErrorKind::InvalidEnumValue,
            DecodeError::EnumNotRegistered { .. } => ErrorKind::EnumNotRegistered,
            DecodeError::InvalidTimestamp { .. } => ErrorKind::InvalidTimestamp,
            DecodeError::InvalidDuration { .. } => ErrorKind::InvalidDuration,
            DecodeError::InvalidStructuredValue { .. } => ErrorKind::InvalidStructuredValue,
            DecodeError::UnsupportedMessageType { .. } => ErrorKind::UnsupportedMessageType,
            DecodeError::UnknownMessageType(_) => ErrorKind::UnknownMessageType,
        }
    }

    /// The error underneath list-element and map-entry wrappers.
    pub fn innermost(&self) -> &DecodeError {
        match self {
            DecodeError::ListElement { source, .. } | DecodeError::MapEntry { source, .. } => source.innermost(),
            other => other,
        }
    }
}

/// Error envelope handed back to clients when a request's parameters are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

impl From<&DecodeError> for ErrorBody {
    fn from(e: &DecodeError) -> Self {
        Self { code: 1, message: e.to_string() }
    }
}
