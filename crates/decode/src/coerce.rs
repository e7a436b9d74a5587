//! String -> typed value coercion for scalar kinds, enums and well-known types.

#![forbid(unsafe_code)]

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use qbind_core::Value;
use qbind_schema::{FieldType, Kind, Registry};

use crate::error::{DecodeError, ScalarError};
use crate::wellknown;

/// Standard alphabet, canonical padding, non-zero trailing bits tolerated.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// URL-safe alphabet, padding optional, non-zero trailing bits tolerated.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Coerce one raw string into a value of type `ty`. `field` is the dotted path used in errors.
pub fn coerce(registry: &Registry, field: &str, ty: &FieldType, raw: &str) -> Result<Value, DecodeError> {
    match ty.kind {
        Kind::Enum => enum_value(registry, field, ty.type_name().unwrap_or_default(), raw),
        Kind::Message | Kind::Group => {
            let type_name = ty.type_name().unwrap_or_default();
            match registry.well_known(type_name) {
                Some(wkt) => wellknown::coerce(wkt, field, raw).map(Value::WellKnown),
                None => Err(DecodeError::UnsupportedMessageType { field: field.to_string(), type_name: type_name.to_string() }),
            }
        }
        kind => scalar(kind, raw).map_err(|source| DecodeError::Coercion { field: field.to_string(), source }),
    }
}

/// Parse a primitive kind. Enum and message kinds are not scalars.
pub fn scalar(kind: Kind, raw: &str) -> Result<Value, ScalarError> {
    Ok(match kind {
        Kind::Bool => Value::Bool(parse_bool(raw)?),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(raw.parse()?),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(raw.parse()?),
        Kind::Uint32 | Kind::Fixed32 => Value::U32(unsigned(raw)?.parse()?),
        Kind::Uint64 | Kind::Fixed64 => Value::U64(unsigned(raw)?.parse()?),
        Kind::Float => Value::F32(parse_f32(raw)?),
        Kind::Double => Value::F64(parse_f64(raw)?),
        Kind::String => Value::String(raw.to_string()),
        Kind::Bytes => Value::Bytes(decode_bytes(raw)?),
        Kind::Enum | Kind::Message | Kind::Group => return Err(ScalarError::NotScalar(kind.as_str())),
    })
}

pub fn parse_bool(raw: &str) -> Result<bool, ScalarError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ScalarError::Bool(raw.to_string())),
    }
}

/// Unsigned literals take no sign at all.
fn unsigned(raw: &str) -> Result<&str, ScalarError> {
    if raw.starts_with('+') { return Err(ScalarError::Syntax(raw.to_string())); }
    Ok(raw)
}

fn is_inf_literal(raw: &str) -> bool {
    let s = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinity")
}

pub fn parse_f32(raw: &str) -> Result<f32, ScalarError> {
    let v: f32 = raw.parse()?;
    if v.is_infinite() && !is_inf_literal(raw) { return Err(ScalarError::Range(raw.to_string())); }
    Ok(v)
}

pub fn parse_f64(raw: &str) -> Result<f64, ScalarError> {
    let v: f64 = raw.parse()?;
    if v.is_infinite() && !is_inf_literal(raw) { return Err(ScalarError::Range(raw.to_string())); }
    Ok(v)
}

/// Standard base64 first, then URL-safe with or without padding.
pub fn decode_bytes(raw: &str) -> Result<Vec<u8>, ScalarError> {
    match STANDARD_LENIENT.decode(raw) {
        Ok(b) => Ok(b),
        Err(_) => Ok(URL_SAFE_LENIENT.decode(raw)?),
    }
}

fn enum_value(registry: &Registry, field: &str, enum_name: &str, raw: &str) -> Result<Value, DecodeError> {
    let Some(ed) = registry.enumeration(enum_name) else {
        return Err(DecodeError::EnumNotRegistered { field: field.to_string(), enum_name: enum_name.to_string() });
    };
    if let Some(v) = ed.by_name(raw) {
        return Ok(Value::Enum(v.number));
    }
    raw.parse::<i32>()
        .ok()
        .and_then(|n| ed.by_number(n))
        .map(|v| Value::Enum(v.number))
        .ok_or_else(|| DecodeError::InvalidEnumValue {
            field: field.to_string(),
            enum_name: enum_name.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbind_schema::EnumDescriptor;

    fn registry() -> Registry {
        Registry::builder()
            .enumeration(EnumDescriptor::new("t.Color").with_value("RED", 0).with_value("GREEN", 1).with_value("BLUE", 2))
            .build()
            .unwrap()
    }

    #[test]
    fn integers_respect_width_and_sign() {
        assert_eq!(scalar(Kind::Int32, "-2147483648"), Ok(Value::I32(i32::MIN)));
        assert!(matches!(scalar(Kind::Sint32, "2147483648"), Err(ScalarError::Int(_))));
        assert_eq!(scalar(Kind::Sfixed64, "+42"), Ok(Value::I64(42)));
        assert_eq!(scalar(Kind::Fixed32, "4294967295"), Ok(Value::U32(u32::MAX)));
        assert!(matches!(scalar(Kind::Uint32, "4294967296"), Err(ScalarError::Int(_))));
        assert!(matches!(scalar(Kind::Uint64, "-1"), Err(ScalarError::Int(_))));
        assert!(matches!(scalar(Kind::Uint64, "+1"), Err(ScalarError::Syntax(_))));
        assert!(matches!(scalar(Kind::Int64, "0x10"), Err(ScalarError::Int(_))));
        assert!(matches!(scalar(Kind::Int64, ""), Err(ScalarError::Int(_))));
    }

    #[test]
    fn canonical_forms_round_trip() {
        for (kind, v) in [
            (Kind::Bool, Value::Bool(true)),
            (Kind::Int32, Value::I32(-17)),
            (Kind::Int64, Value::I64(i64::MAX)),
            (Kind::Uint32, Value::U32(7)),
            (Kind::Uint64, Value::U64(u64::MAX)),
            (Kind::Float, Value::F32(1.25)),
            (Kind::Double, Value::F64(-0.001)),
            (Kind::String, Value::String("héllo wörld".into())),
        ] {
            let text = match &v {
                Value::Bool(b) => b.to_string(),
                Value::I32(n) => n.to_string(),
                Value::I64(n) => n.to_string(),
                Value::U32(n) => n.to_string(),
                Value::U64(n) => n.to_string(),
                Value::F32(n) => n.to_string(),
                Value::F64(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => unreachable!(),
            };
            assert_eq!(scalar(kind, &text), Ok(v));
        }
    }

    #[test]
    fn bool_aliases() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] { assert_eq!(parse_bool(t), Ok(true)); }
        for f in ["0", "f", "F", "FALSE", "false", "False"] { assert_eq!(parse_bool(f), Ok(false)); }
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("tRUE").is_err());
    }

    #[test]
    fn floats_reject_overflow_but_accept_infinity() {
        assert!(matches!(parse_f32("1e39"), Err(ScalarError::Range(_))));
        assert!(parse_f64("1e39").is_ok());
        assert!(matches!(parse_f64("1e400"), Err(ScalarError::Range(_))));
        assert_eq!(parse_f64("-Inf"), Ok(f64::NEG_INFINITY));
        assert_eq!(parse_f32("infinity"), Ok(f32::INFINITY));
        assert!(parse_f64("NaN").unwrap().is_nan());
        assert!(matches!(parse_f64("1,5"), Err(ScalarError::Float(_))));
    }

    #[test]
    fn bytes_try_standard_then_url_safe() {
        // valid standard, invalid URL-safe
        assert_eq!(decode_bytes("+/8="), Ok(vec![0xfb, 0xff]));
        // URL-safe, unpadded
        assert_eq!(decode_bytes("-_8"), Ok(vec![0xfb, 0xff]));
        // URL-safe, padded
        assert_eq!(decode_bytes("-_8="), Ok(vec![0xfb, 0xff]));
        assert_eq!(decode_bytes("aGVsbG8="), Ok(b"hello".to_vec()));
        assert!(matches!(decode_bytes("!!!"), Err(ScalarError::Bytes(_))));
    }

    #[test]
    fn bytes_ignore_stray_trailing_bits() {
        assert_eq!(decode_bytes("QR=="), Ok(b"A".to_vec()));
        assert_eq!(decode_bytes("QR"), Ok(b"A".to_vec()));
        assert_eq!(decode_bytes("QUJ="), Ok(b"AB".to_vec()));
    }

    #[test]
    fn enum_by_symbol_then_number() {
        let reg = registry();
        let ty = FieldType::enumeration("t.Color");
        assert_eq!(coerce(&reg, "color", &ty, "GREEN").unwrap(), Value::Enum(1));
        assert_eq!(coerce(&reg, "color", &ty, "2").unwrap(), Value::Enum(2));
        assert!(matches!(coerce(&reg, "color", &ty, "7"), Err(DecodeError::InvalidEnumValue { .. })));
        assert!(matches!(coerce(&reg, "color", &ty, "green"), Err(DecodeError::InvalidEnumValue { .. })));
        let missing = FieldType::enumeration("t.Shade");
        assert!(matches!(coerce(&reg, "shade", &missing, "RED"), Err(DecodeError::EnumNotRegistered { .. })));
    }

    #[test]
    fn user_messages_cannot_be_set_from_a_literal() {
        let reg = registry();
        let err = coerce(&reg, "page", &FieldType::message("t.Page"), "1").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedMessageType { ref type_name, .. } if type_name == "t.Page"));
    }

    #[test]
    fn coercion_error_names_the_field() {
        let reg = registry();
        let err = coerce(&reg, "page.size", &FieldType::scalar(Kind::Int32), "ten").unwrap_err();
        assert!(matches!(err, DecodeError::Coercion { ref field, .. } if field == "page.size"));
    }
}
