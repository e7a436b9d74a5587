//! qbind schema: the type registry a decode is driven by.
//!
//! A [`Registry`] maps fully-qualified type names to message and enum descriptors.
//! It is built once (programmatically or from a YAML/JSON document), validated,
//! and then only read. Well-known composite types are identified by name and never
//! registered.

#![forbid(unsafe_code)]

mod descriptor;
mod doc;
mod kind;
mod registry;

pub use descriptor::{EnumDescriptor, EnumValue, FieldDescriptor, MessageDescriptor};
pub use doc::{EnumDoc, EnumValueDoc, FieldDoc, MessageDoc, SchemaDoc};
pub use kind::{json_name_of, Cardinality, FieldType, Kind, WellKnownType};
pub use registry::{DanglingRef, Registry, RegistryBuilder, SchemaError};
