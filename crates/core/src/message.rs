//! Mutable message tree built up during a decode.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{MapKey, Value};

/// Contents of one field slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Singular(Value),
    List(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
}

impl FieldValue {
    pub fn as_singular(&self) -> Option<&Value> {
        match self {
            FieldValue::Singular(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            FieldValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// One instance per (possibly nested) message. Slots are keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    type_name: String,
    fields: BTreeMap<String, FieldValue>,
    /// oneof group -> member currently set
    #[serde(skip)]
    oneofs: BTreeMap<String, String>,
}

impl Message {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), fields: BTreeMap::new(), oneofs: BTreeMap::new() }
    }

    pub fn type_name(&self) -> &str { &self.type_name }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn get(&self, field: &str) -> Option<&FieldValue> { self.fields.get(field) }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Set a singular slot, replacing whatever was there.
    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), FieldValue::Singular(value));
    }

    /// Append to a repeated slot. A slot holding something other than a list is replaced.
    pub fn push(&mut self, field: &str, value: Value) {
        let slot = self.fields.entry(field.to_string()).or_insert_with(|| FieldValue::List(Vec::new()));
        match slot {
            FieldValue::List(items) => items.push(value),
            other => *other = FieldValue::List(vec![value]),
        }
    }

    /// Set a map entry, overwriting any prior value under the same key.
    pub fn insert_entry(&mut self, field: &str, key: MapKey, value: Value) {
        let slot = self.fields.entry(field.to_string()).or_insert_with(|| FieldValue::Map(BTreeMap::new()));
        match slot {
            FieldValue::Map(entries) => { entries.insert(key, value); }
            other => *other = FieldValue::Map(BTreeMap::from([(key, value)])),
        }
    }

    /// Fetch the nested message in a singular slot, creating an empty `type_name` message if absent.
    /// Returns `None` when the slot already holds a non-message value.
    pub fn child_mut(&mut self, field: &str, type_name: &str) -> Option<&mut Message> {
        let slot = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| FieldValue::Singular(Value::Message(Box::new(Message::new(type_name)))));
        match slot {
            FieldValue::Singular(Value::Message(m)) => Some(m.as_mut()),
            _ => None,
        }
    }

    pub fn which_oneof(&self, group: &str) -> Option<&str> {
        self.oneofs.get(group).map(|s| s.as_str())
    }

    pub fn mark_oneof(&mut self, group: &str, field: &str) {
        self.oneofs.insert(group.to_string(), field.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut m = Message::new("t.Req");
        for s in ["a", "b", "c"] { m.push("tags", Value::String(s.into())); }
        let list = m.get("tags").and_then(|f| f.as_list()).unwrap();
        let got: Vec<_> = list.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_entry_overwrites_same_key() {
        let mut m = Message::new("t.Req");
        m.insert_entry("labels", MapKey::String("env".into()), Value::String("dev".into()));
        m.insert_entry("labels", MapKey::String("env".into()), Value::String("prod".into()));
        let map = m.get("labels").and_then(|f| f.as_map()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&MapKey::String("env".into())], Value::String("prod".into()));
    }

    #[test]
    fn child_mut_materializes_once() {
        let mut m = Message::new("t.Req");
        m.child_mut("page", "t.Page").unwrap().set("size", Value::I32(10));
        m.child_mut("page", "t.Page").unwrap().set("token", Value::String("x".into()));
        let page = m.get("page").and_then(|f| f.as_singular()).and_then(|v| v.as_message()).unwrap();
        assert_eq!(page.type_name(), "t.Page");
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn child_mut_refuses_scalar_slot() {
        let mut m = Message::new("t.Req");
        m.set("page", Value::I32(1));
        assert!(m.child_mut("page", "t.Page").is_none());
    }

    #[test]
    fn oneof_record() {
        let mut m = Message::new("t.Req");
        assert_eq!(m.which_oneof("sel"), None);
        m.mark_oneof("sel", "by_id");
        assert_eq!(m.which_oneof("sel"), Some("by_id"));
    }
}
