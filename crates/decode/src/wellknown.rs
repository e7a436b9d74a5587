//! Literal encodings of the well-known composite types.

#![forbid(unsafe_code)]

use chrono::DateTime;
use qbind_core::WellKnown;
use qbind_schema::WellKnownType;
use serde_json::Value as Json;

use crate::coerce;
use crate::duration;
use crate::error::DecodeError;

pub fn coerce(wkt: WellKnownType, field: &str, raw: &str) -> Result<WellKnown, DecodeError> {
    match wkt {
        WellKnownType::Timestamp => {
            let (seconds, nanos) = timestamp(raw).map_err(|reason| DecodeError::InvalidTimestamp {
                field: field.to_string(),
                value: raw.to_string(),
                reason,
            })?;
            Ok(WellKnown::Timestamp { seconds, nanos })
        }
        WellKnownType::Duration => {
            let (seconds, nanos) = duration::parse_duration(raw).map_err(|e| DecodeError::InvalidDuration {
                field: field.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            })?;
            Ok(WellKnown::Duration { seconds, nanos })
        }
        WellKnownType::FieldMask => Ok(WellKnown::FieldMask { paths: raw.split(',').map(str::to_string).collect() }),
        WellKnownType::Value => structured(raw)
            .map(WellKnown::Value)
            .map_err(|reason| DecodeError::InvalidStructuredValue { field: field.to_string(), reason }),
        WellKnownType::Struct => match structured(raw) {
            Ok(Json::Object(map)) => Ok(WellKnown::Struct(map)),
            Ok(_) => Err(DecodeError::InvalidStructuredValue { field: field.to_string(), reason: "expected a JSON object".to_string() }),
            Err(reason) => Err(DecodeError::InvalidStructuredValue { field: field.to_string(), reason }),
        },
        wrapper => {
            // Every remaining identity is a boxed scalar.
            let kind = wrapper.wrapped_kind().ok_or_else(|| DecodeError::UnsupportedMessageType {
                field: field.to_string(),
                type_name: wrapper.full_name().to_string(),
            })?;
            let inner = coerce::scalar(kind, raw).map_err(|source| DecodeError::Coercion { field: field.to_string(), source })?;
            Ok(WellKnown::Wrapper(Box::new(inner)))
        }
    }
}

/// 10 characters: epoch seconds. 13 characters: epoch milliseconds. Otherwise RFC 3339.
fn timestamp(raw: &str) -> Result<(i64, i32), String> {
    match raw.len() {
        10 => epoch_integer(raw).map(|s| (s, 0)),
        // nanos stay in [0, 1e9) for pre-epoch instants
        13 => epoch_integer(raw).map(|ms| (ms.div_euclid(1_000), (ms.rem_euclid(1_000) * 1_000_000) as i32)),
        _ => {
            let dt = DateTime::parse_from_rfc3339(raw).map_err(|e| e.to_string())?;
            Ok((dt.timestamp(), dt.timestamp_subsec_nanos() as i32))
        }
    }
}

fn epoch_integer(raw: &str) -> Result<i64, String> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("not an epoch integer".to_string());
    }
    raw.parse::<i64>().map_err(|e| e.to_string())
}

/// Parse JSON into the dynamic-value form, where every number is a double.
fn structured(raw: &str) -> Result<Json, String> {
    let v: Json = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Ok(numbers_as_doubles(v))
}

fn numbers_as_doubles(v: Json) -> Json {
    match v {
        Json::Number(n) => n
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Json::Array(items) => Json::Array(items.into_iter().map(numbers_as_doubles).collect()),
        Json::Object(map) => Json::Object(map.into_iter().map(|(k, v)| (k, numbers_as_doubles(v))).collect()),
        other => other,
    }
}
