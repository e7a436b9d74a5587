//! Canonical JSON rendering of a decoded message tree.

#![forbid(unsafe_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use qbind_core::{FieldValue, Message, Value, WellKnown};
use qbind_schema::{FieldType, Kind, Registry};
use serde_json::{Map, Value as Json};

/// Render `msg` as JSON: alternate (json) names as keys in declaration order, 64-bit
/// integers as strings, bytes as standard base64, enums by symbol.
pub fn render_json(msg: &Message, registry: &Registry) -> Json {
    let mut out = Map::new();
    match registry.message(msg.type_name()) {
        Some(md) => {
            for fd in md.fields() {
                if let Some(fv) = msg.get(fd.name()) {
                    out.insert(fd.json_name().to_string(), render_field(fv, Some(fd.field_type()), registry));
                }
            }
        }
        None => {
            for (name, fv) in msg.fields() {
                out.insert(name.to_string(), render_field(fv, None, registry));
            }
        }
    }
    Json::Object(out)
}

fn render_field(fv: &FieldValue, ty: Option<&FieldType>, registry: &Registry) -> Json {
    match fv {
        FieldValue::Singular(v) => render_value(v, ty, registry),
        FieldValue::List(items) => Json::Array(items.iter().map(|v| render_value(v, ty, registry)).collect()),
        FieldValue::Map(entries) => Json::Object(
            entries.iter().map(|(k, v)| (k.to_string(), render_value(v, ty, registry))).collect(),
        ),
    }
}

fn render_value(v: &Value, ty: Option<&FieldType>, registry: &Registry) -> Json {
    match v {
        Value::Bool(b) => Json::Bool(*b),
        Value::I32(n) => Json::from(*n),
        Value::U32(n) => Json::from(*n),
        Value::I64(n) => Json::String(n.to_string()),
        Value::U64(n) => Json::String(n.to_string()),
        // Through the shortest decimal form so 0.1f32 renders as 0.1.
        Value::F32(f) => float(*f as f64, f.to_string().parse::<f64>().ok()),
        Value::F64(f) => float(*f, Some(*f)),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(STANDARD.encode(b)),
        Value::Enum(n) => {
            let symbol = ty
                .filter(|t| t.kind == Kind::Enum)
                .and_then(|t| t.type_name())
                .and_then(|name| registry.enumeration(name))
                .and_then(|ed| ed.by_number(*n));
            match symbol {
                Some(ev) => Json::String(ev.name.clone()),
                None => Json::from(*n),
            }
        }
        Value::Message(m) => render_json(m, registry),
        Value::WellKnown(w) => render_well_known(w, registry),
    }
}

fn float(raw: f64, shortest: Option<f64>) -> Json {
    if raw.is_nan() {
        Json::String("NaN".to_string())
    } else if raw.is_infinite() {
        Json::String(if raw > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        shortest
            .and_then(serde_json::Number::from_f64)
            .map(Json::Number)
            .unwrap_or(Json::Null)
    }
}

fn render_well_known(w: &WellKnown, registry: &Registry) -> Json {
    match w {
        WellKnown::Timestamp { seconds, nanos } => timestamp(*seconds, *nanos).map(Json::String).unwrap_or(Json::Null),
        WellKnown::Duration { seconds, nanos } => Json::String(format_duration(*seconds, *nanos)),
        WellKnown::Wrapper(inner) => render_value(inner, None, registry),
        WellKnown::FieldMask { paths } => Json::String(paths.join(",")),
        WellKnown::Struct(map) => Json::Object(map.clone()),
        WellKnown::Value(v) => v.clone(),
    }
}

/// RFC 3339 in UTC. Out-of-range nanos are carried into the seconds rather than dropped.
fn timestamp(seconds: i64, nanos: i32) -> Option<String> {
    let secs = seconds.checked_add(i64::from(nanos.div_euclid(1_000_000_000)))?;
    let nanos = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos).map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// `<secs>[.frac]s` with 0, 3, 6 or 9 fractional digits.
pub fn format_duration(seconds: i64, nanos: i32) -> String {
    let negative = seconds < 0 || nanos < 0;
    let secs = seconds.unsigned_abs();
    let frac = nanos.unsigned_abs();
    let sign = if negative { "-" } else { "" };
    if frac == 0 {
        return format!("{sign}{secs}s");
    }
    let digits = format!("{frac:09}");
    let digits = if frac % 1_000_000 == 0 {
        &digits[..3]
    } else if frac % 1_000 == 0 {
        &digits[..6]
    } else {
        &digits[..]
    };
    format!("{sign}{secs}.{digits}s")
}
