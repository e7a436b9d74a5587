#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::descriptor::{EnumDescriptor, IndexConflict, MessageDescriptor};
use crate::kind::{Cardinality, WellKnownType};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("type {0:?} is registered twice")]
    DuplicateType(String),
    #[error("type {0:?} is reserved for a well-known type")]
    ReservedName(String),
    #[error("field {field:?} is declared twice in {message:?}")]
    DuplicateField { message: String, field: String },
    #[error("json name {json_name:?} collides with another field in {message:?}")]
    DuplicateJsonName { message: String, json_name: String },
    #[error("enum symbol {symbol:?} is declared twice in {enumeration:?}")]
    DuplicateEnumSymbol { enumeration: String, symbol: String },
    #[error("enum {0:?} declares no values")]
    EmptyEnum(String),
    #[error("{message}.{field}: {kind} fields need a type name")]
    MissingTypeName { message: String, field: String, kind: String },
    #[error("{message}.{field}: {kind} fields take no type name")]
    UnexpectedTypeName { message: String, field: String, kind: String },
    #[error("{message}.{field}: {kind} cannot key a map")]
    InvalidMapKey { message: String, field: String, kind: String },
    #[error("{message}.{field}: oneof {oneof:?} members must be singular")]
    NonSingularOneofMember { message: String, field: String, oneof: String },
    #[error("{message}.{field}: a field is either repeated or a map, not both")]
    ConflictingCardinality { message: String, field: String },
}

/// A referenced type name that is neither registered nor well-known.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DanglingRef {
    pub message: String,
    pub field: String,
    pub type_name: String,
}

/// Immutable type registry. Built once, then shared read-only across decodes.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    messages: FxHashMap<String, MessageDescriptor>,
    enums: FxHashMap<String, EnumDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder { RegistryBuilder::default() }

    pub fn message(&self, full_name: &str) -> Option<&MessageDescriptor> { self.messages.get(full_name) }

    pub fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> { self.enums.get(full_name) }

    pub fn well_known(&self, full_name: &str) -> Option<WellKnownType> { WellKnownType::from_full_name(full_name) }

    /// Registered message names, sorted.
    pub fn message_names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.messages.keys().map(|s| s.as_str()).collect();
        v.sort_unstable();
        v
    }

    /// Registered enum names, sorted.
    pub fn enum_names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.enums.keys().map(|s| s.as_str()).collect();
        v.sort_unstable();
        v
    }

    /// Type references that resolve to nothing. Decoding tolerates these; they only
    /// fail when a request actually reaches the field.
    pub fn dangling_references(&self) -> Vec<DanglingRef> {
        let mut out = Vec::new();
        for md in self.messages.values() {
            for f in md.fields() {
                let Some(tn) = f.field_type().type_name() else { continue };
                let known = if f.kind().is_message() {
                    self.messages.contains_key(tn) || WellKnownType::from_full_name(tn).is_some()
                } else {
                    self.enums.contains_key(tn)
                };
                if !known {
                    out.push(DanglingRef { message: md.name().to_string(), field: f.name().to_string(), type_name: tn.to_string() });
                }
            }
        }
        out.sort_by(|a, b| a.message.cmp(&b.message).then(a.field.cmp(&b.field)));
        out
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    messages: Vec<MessageDescriptor>,
    enums: Vec<EnumDescriptor>,
}

impl RegistryBuilder {
    pub fn message(mut self, md: MessageDescriptor) -> Self {
        self.messages.push(md);
        self
    }

    pub fn enumeration(mut self, ed: EnumDescriptor) -> Self {
        self.enums.push(ed);
        self
    }

    pub fn add_message(&mut self, md: MessageDescriptor) { self.messages.push(md); }

    pub fn add_enum(&mut self, ed: EnumDescriptor) { self.enums.push(ed); }

    /// Validate every descriptor and freeze the registry.
    pub fn build(self) -> Result<Registry, SchemaError> {
        let mut reg = Registry::default();
        for mut md in self.messages {
            let name = md.name().to_string();
            if WellKnownType::from_full_name(&name).is_some() {
                return Err(SchemaError::ReservedName(name));
            }
            validate_fields(&md)?;
            md.index().map_err(|c| match c {
                IndexConflict::Name(field) => SchemaError::DuplicateField { message: name.clone(), field },
                IndexConflict::JsonName(json_name) => SchemaError::DuplicateJsonName { message: name.clone(), json_name },
            })?;
            if reg.enums.contains_key(&name) || reg.messages.insert(name.clone(), md).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }
        for mut ed in self.enums {
            let name = ed.name().to_string();
            if WellKnownType::from_full_name(&name).is_some() {
                return Err(SchemaError::ReservedName(name));
            }
            if ed.values().is_empty() {
                return Err(SchemaError::EmptyEnum(name));
            }
            ed.index().map_err(|c| match c {
                IndexConflict::Name(symbol) | IndexConflict::JsonName(symbol) => {
                    SchemaError::DuplicateEnumSymbol { enumeration: name.clone(), symbol }
                }
            })?;
            if reg.messages.contains_key(&name) || reg.enums.insert(name.clone(), ed).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }
        debug!(messages = reg.messages.len(), enums = reg.enums.len(), "schema registry built");
        Ok(reg)
    }
}

fn validate_fields(md: &MessageDescriptor) -> Result<(), SchemaError> {
    for f in md.fields() {
        let ctx = || (md.name().to_string(), f.name().to_string());
        let kind = f.kind();
        match (kind.needs_type_name(), f.field_type().type_name()) {
            (true, None) => {
                let (message, field) = ctx();
                return Err(SchemaError::MissingTypeName { message, field, kind: kind.to_string() });
            }
            (false, Some(_)) => {
                let (message, field) = ctx();
                return Err(SchemaError::UnexpectedTypeName { message, field, kind: kind.to_string() });
            }
            _ => {}
        }
        if let Cardinality::Map(key) = f.cardinality() {
            if !key.can_key_map() {
                let (message, field) = ctx();
                return Err(SchemaError::InvalidMapKey { message, field, kind: key.to_string() });
            }
        }
        if let Some(oneof) = f.oneof() {
            if f.cardinality() != Cardinality::Singular {
                let (message, field) = ctx();
                return Err(SchemaError::NonSingularOneofMember { message, field, oneof: oneof.to_string() });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::kind::{FieldType, Kind};

    fn color() -> EnumDescriptor {
        EnumDescriptor::new("t.Color").with_value("RED", 0).with_value("BLUE", 2)
    }

    #[test]
    fn builds_and_resolves() {
        let reg = Registry::builder()
            .message(
                MessageDescriptor::new("t.Req")
                    .with_field(FieldDescriptor::scalar("page_size", Kind::Int32))
                    .with_field(FieldDescriptor::new("color", FieldType::enumeration("t.Color"))),
            )
            .enumeration(color())
            .build()
            .unwrap();
        assert!(reg.message("t.Req").is_some());
        assert_eq!(reg.enumeration("t.Color").and_then(|e| e.by_name("BLUE")).map(|v| v.number), Some(2));
        assert_eq!(reg.well_known("google.protobuf.Duration"), Some(WellKnownType::Duration));
        assert!(reg.dangling_references().is_empty());
        assert_eq!(reg.message_names(), vec!["t.Req"]);
    }

    #[test]
    fn rejects_duplicates_and_reserved_names() {
        let dup = Registry::builder()
            .message(MessageDescriptor::new("t.A"))
            .message(MessageDescriptor::new("t.A"))
            .build();
        assert_eq!(dup.unwrap_err(), SchemaError::DuplicateType("t.A".into()));

        let clash = Registry::builder().message(MessageDescriptor::new("t.Color")).enumeration(color()).build();
        assert_eq!(clash.unwrap_err(), SchemaError::DuplicateType("t.Color".into()));

        let reserved = Registry::builder().message(MessageDescriptor::new("google.protobuf.Timestamp")).build();
        assert!(matches!(reserved, Err(SchemaError::ReservedName(_))));
    }

    #[test]
    fn rejects_bad_fields() {
        let no_type = Registry::builder()
            .message(MessageDescriptor::new("t.A").with_field(FieldDescriptor::scalar("e", Kind::Enum)))
            .build();
        assert!(matches!(no_type, Err(SchemaError::MissingTypeName { .. })));

        let float_key = Registry::builder()
            .message(MessageDescriptor::new("t.A").with_field(FieldDescriptor::scalar("m", Kind::String).map(Kind::Float)))
            .build();
        assert!(matches!(float_key, Err(SchemaError::InvalidMapKey { .. })));

        let repeated_oneof = Registry::builder()
            .message(MessageDescriptor::new("t.A").with_field(FieldDescriptor::scalar("x", Kind::Int32).repeated().in_oneof("sel")))
            .build();
        assert!(matches!(repeated_oneof, Err(SchemaError::NonSingularOneofMember { .. })));

        let dup_field = Registry::builder()
            .message(
                MessageDescriptor::new("t.A")
                    .with_field(FieldDescriptor::scalar("x", Kind::Int32))
                    .with_field(FieldDescriptor::scalar("x", Kind::Int64)),
            )
            .build();
        assert!(matches!(dup_field, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn reports_dangling_references() {
        let reg = Registry::builder()
            .message(
                MessageDescriptor::new("t.A")
                    .with_field(FieldDescriptor::new("b", FieldType::message("t.B")))
                    .with_field(FieldDescriptor::new("ts", FieldType::message("google.protobuf.Timestamp")))
                    .with_field(FieldDescriptor::new("c", FieldType::enumeration("t.C"))),
            )
            .build()
            .unwrap();
        let refs: Vec<_> = reg.dangling_references().into_iter().map(|r| r.type_name).collect();
        assert_eq!(refs, vec!["t.B".to_string(), "t.C".to_string()]);
    }
}
