//! Field, message and enum descriptors.

#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::kind::{json_name_of, Cardinality, FieldType, Kind};

/// Schema entry for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    name: String,
    json_name: String,
    field_type: FieldType,
    cardinality: Cardinality,
    oneof: Option<String>,
}

impl FieldDescriptor {
    /// Singular field; alternate name defaults to lowerCamelCase.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        let json_name = json_name_of(&name);
        Self { name, json_name, field_type, cardinality: Cardinality::Singular, oneof: None }
    }

    pub fn scalar(name: impl Into<String>, kind: Kind) -> Self {
        Self::new(name, FieldType::scalar(kind))
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Turn into a map keyed by `key`; the field type becomes the map value type.
    pub fn map(mut self, key: Kind) -> Self {
        self.cardinality = Cardinality::Map(key);
        self
    }

    pub fn in_oneof(mut self, group: impl Into<String>) -> Self {
        self.oneof = Some(group.into());
        self
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn json_name(&self) -> &str { &self.json_name }
    pub fn field_type(&self) -> &FieldType { &self.field_type }
    pub fn kind(&self) -> Kind { self.field_type.kind }
    pub fn cardinality(&self) -> Cardinality { self.cardinality }
    pub fn oneof(&self) -> Option<&str> { self.oneof.as_deref() }

    pub fn is_list(&self) -> bool { self.cardinality == Cardinality::Repeated }

    pub fn is_map(&self) -> bool { matches!(self.cardinality, Cardinality::Map(_)) }

    pub fn map_key(&self) -> Option<Kind> {
        match self.cardinality {
            Cardinality::Map(k) => Some(k),
            _ => None,
        }
    }

    /// Singular, non-repeated, message-kind: the only shape a path may descend through.
    pub fn is_singular_message(&self) -> bool {
        self.cardinality == Cardinality::Singular && self.field_type.kind.is_message()
    }
}

/// Ordered set of fields for one message type.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    #[serde(skip)]
    by_name: FxHashMap<String, usize>,
    #[serde(skip)]
    by_json: FxHashMap<String, usize>,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new(), by_name: FxHashMap::default(), by_json: FxHashMap::default() }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn fields(&self) -> &[FieldDescriptor] { &self.fields }

    /// Look up by exact name, then by alternate name.
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name
            .get(name)
            .or_else(|| self.by_json.get(name))
            .and_then(|&i| self.fields.get(i))
    }

    /// Fields that share the given oneof group, in declaration order.
    pub fn oneof_members<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.fields.iter().filter(move |f| f.oneof() == Some(group))
    }

    /// Fill the lookup indexes. Returns the first duplicate name, if any.
    pub(crate) fn index(&mut self) -> Result<(), IndexConflict> {
        self.by_name.clear();
        self.by_json.clear();
        for (i, f) in self.fields.iter().enumerate() {
            if self.by_name.insert(f.name.clone(), i).is_some() {
                return Err(IndexConflict::Name(f.name.clone()));
            }
        }
        for (i, f) in self.fields.iter().enumerate() {
            // A json name equal to the field's own name is not a conflict.
            match self.by_json.insert(f.json_name.clone(), i) {
                Some(prev) if prev != i => return Err(IndexConflict::JsonName(f.json_name.clone())),
                _ => {}
            }
            if let Some(&other) = self.by_name.get(&f.json_name) {
                if other != i {
                    return Err(IndexConflict::JsonName(f.json_name.clone()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) enum IndexConflict {
    Name(String),
    JsonName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// Enum type: symbol and number lookups. On number aliases the first declared symbol wins.
#[derive(Debug, Clone, Serialize)]
pub struct EnumDescriptor {
    name: String,
    values: Vec<EnumValue>,
    #[serde(skip)]
    by_name: FxHashMap<String, usize>,
    #[serde(skip)]
    by_number: FxHashMap<i32, usize>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), values: Vec::new(), by_name: FxHashMap::default(), by_number: FxHashMap::default() }
    }

    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue { name: name.into(), number });
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn values(&self) -> &[EnumValue] { &self.values }

    pub fn by_name(&self, symbol: &str) -> Option<&EnumValue> {
        self.by_name.get(symbol).and_then(|&i| self.values.get(i))
    }

    pub fn by_number(&self, number: i32) -> Option<&EnumValue> {
        self.by_number.get(&number).and_then(|&i| self.values.get(i))
    }

    pub(crate) fn index(&mut self) -> Result<(), IndexConflict> {
        self.by_name.clear();
        self.by_number.clear();
        for (i, v) in self.values.iter().enumerate() {
            if self.by_name.insert(v.name.clone(), i).is_some() {
                return Err(IndexConflict::Name(v.name.clone()));
            }
            self.by_number.entry(v.number).or_insert(i);
        }
        Ok(())
    }
}
