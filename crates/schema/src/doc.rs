//! Schema documents (YAML or JSON) and loading them into a [`Registry`].

#![forbid(unsafe_code)]

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::descriptor::{EnumDescriptor, FieldDescriptor, MessageDescriptor};
use crate::kind::{FieldType, Kind};
use crate::registry::{Registry, SchemaError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDoc {
    #[serde(default)]
    pub messages: Vec<MessageDoc>,
    #[serde(default)]
    pub enums: Vec<EnumDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDoc {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_name: Option<String>,
    #[serde(default)]
    pub repeated: bool,
    /// Present for map fields; `kind`/`type_name` then describe the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_key: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDoc {
    pub name: String,
    pub values: Vec<EnumValueDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValueDoc {
    pub name: String,
    pub number: i32,
}

impl FieldDoc {
    fn into_descriptor(self, message: &str) -> Result<FieldDescriptor, SchemaError> {
        let ft = FieldType { kind: self.kind, type_name: self.type_name };
        let mut fd = FieldDescriptor::new(self.name.clone(), ft);
        match (self.repeated, self.map_key) {
            (true, Some(_)) => {
                return Err(SchemaError::ConflictingCardinality { message: message.to_string(), field: self.name });
            }
            (true, None) => fd = fd.repeated(),
            (false, Some(key)) => fd = fd.map(key),
            (false, None) => {}
        }
        if let Some(j) = self.json_name { fd = fd.with_json_name(j); }
        if let Some(o) = self.oneof { fd = fd.in_oneof(o); }
        Ok(fd)
    }
}

impl SchemaDoc {
    pub fn into_registry(self) -> Result<Registry, SchemaError> {
        let mut b = Registry::builder();
        for m in self.messages {
            let mut md = MessageDescriptor::new(m.name.clone());
            for f in m.fields {
                md = md.with_field(f.into_descriptor(&m.name)?);
            }
            b.add_message(md);
        }
        for e in self.enums {
            let ed = e.values.into_iter().fold(EnumDescriptor::new(e.name), |ed, v| ed.with_value(v.name, v.number));
            b.add_enum(ed);
        }
        b.build()
    }
}

impl Registry {
    pub fn from_yaml_str(s: &str) -> Result<Registry> {
        let doc: SchemaDoc = serde_yaml::from_str(s).context("parsing YAML schema document")?;
        Ok(doc.into_registry()?)
    }

    pub fn from_json_str(s: &str) -> Result<Registry> {
        let doc: SchemaDoc = serde_json::from_str(s).context("parsing JSON schema document")?;
        Ok(doc.into_registry()?)
    }

    /// Load a schema file; `.json` is read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Registry> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;
        let is_json = path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("json")).unwrap_or(false);
        let reg = if is_json { Self::from_json_str(&text) } else { Self::from_yaml_str(&text) };
        reg.with_context(|| format!("loading schema {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Cardinality;

    const YAML: &str = r#"
messages:
  - name: shop.ListOrders
    fields:
      - { name: page_size, kind: int32 }
      - { name: tags, kind: string, repeated: true }
      - { name: labels, kind: string, map_key: string }
      - { name: status, kind: enum, type_name: shop.Status }
      - { name: order_id, kind: string, oneof: selector, json_name: id }
enums:
  - name: shop.Status
    values:
      - { name: STATUS_UNSPECIFIED, number: 0 }
      - { name: OPEN, number: 1 }
"#;

    #[test]
    fn yaml_document_loads() {
        let reg = Registry::from_yaml_str(YAML).unwrap();
        let md = reg.message("shop.ListOrders").unwrap();
        assert_eq!(md.fields().len(), 5);
        assert!(md.find_field("tags").unwrap().is_list());
        assert_eq!(md.find_field("labels").unwrap().cardinality(), Cardinality::Map(Kind::String));
        assert_eq!(md.find_field("id").map(|f| f.name()), Some("order_id"));
        assert_eq!(md.find_field("pageSize").map(|f| f.kind()), Some(Kind::Int32));
        assert_eq!(reg.enumeration("shop.Status").and_then(|e| e.by_number(1)).map(|v| v.name.as_str()), Some("OPEN"));
    }

    #[test]
    fn json_document_loads() {
        let reg = Registry::from_json_str(r#"{"messages":[{"name":"a.B","fields":[{"name":"x","kind":"bool"}]}]}"#).unwrap();
        assert_eq!(reg.message("a.B").and_then(|m| m.find_field("x")).map(|f| f.kind()), Some(Kind::Bool));
    }

    #[test]
    fn repeated_map_field_is_rejected() {
        let err = Registry::from_yaml_str(
            "messages:\n  - name: a.B\n    fields:\n      - { name: x, kind: string, repeated: true, map_key: string }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("either repeated or a map") || format!("{err:#}").contains("either repeated or a map"));
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        assert!(Registry::from_yaml_str("messages:\n  - name: a.B\n    fields:\n      - { name: x, kind: decimal }\n").is_err());
    }
}
