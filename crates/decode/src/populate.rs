#![forbid(unsafe_code)]

use qbind_core::{MapKey, Message, Value};
use qbind_schema::{FieldDescriptor, FieldType, Registry};

use crate::coerce;
use crate::error::{DecodeError, MapPart};

/// Write `values` into `field` on `owner`, enforcing oneof exclusivity and cardinality.
/// `path` is the dotted key, used in error messages. `bracketed` marks keys that came in
/// as `base[capture]`.
pub fn populate(
    registry: &Registry,
    owner: &mut Message,
    field: &FieldDescriptor,
    path: &str,
    values: &[String],
    bracketed: bool,
) -> Result<(), DecodeError> {
    if values.is_empty() {
        return Err(DecodeError::NoValue { path: path.to_string() });
    }
    if let Some(group) = field.oneof() {
        if let Some(existing) = owner.which_oneof(group) {
            return Err(DecodeError::OneofConflict {
                oneof: group.to_string(),
                field: field.name().to_string(),
                existing: existing.to_string(),
            });
        }
    }

    if field.is_list() {
        let items = values
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                coerce::coerce(registry, path, field.field_type(), raw)
                    .map_err(|e| DecodeError::ListElement { field: path.to_string(), index, source: Box::new(e) })
            })
            .collect::<Result<Vec<_>, _>>()?;
        for v in items { owner.push(field.name(), v); }
    } else if let Some(key_kind) = field.map_key() {
        let [raw_key, raw_value] = values else {
            return Err(DecodeError::MapArity { field: path.to_string(), count: values.len() });
        };
        let key = coerce::coerce(registry, path, &FieldType::scalar(key_kind), raw_key)
            .and_then(|k| {
                MapKey::try_from(k).map_err(|e| DecodeError::Coercion { field: path.to_string(), source: e.into() })
            })
            .map_err(|e| map_entry(path, MapPart::Key, e))?;
        let value = coerce::coerce(registry, path, field.field_type(), raw_value)
            .map_err(|e| map_entry(path, MapPart::Value, e))?;
        owner.insert_entry(field.name(), key, value);
    } else {
        if bracketed {
            return Err(DecodeError::UnsupportedPath {
                path: path.to_string(),
                reason: format!("{:?} is a singular field and takes no [key] suffix", field.name()),
            });
        }
        if values.len() > 1 {
            return Err(DecodeError::TooManyValues { field: path.to_string(), values: values.to_vec() });
        }
        let v: Value = coerce::coerce(registry, path, field.field_type(), &values[0])?;
        owner.set(field.name(), v);
    }

    if let Some(group) = field.oneof() {
        owner.mark_oneof(group, field.name());
    }
    Ok(())
}

fn map_entry(path: &str, part: MapPart, source: DecodeError) -> DecodeError {
    DecodeError::MapEntry { field: path.to_string(), part, source: Box::new(source) }
}
