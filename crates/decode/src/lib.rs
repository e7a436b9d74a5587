//! qbind decoder: bind a flat multimap of query parameters into a schema-typed message tree.
//!
//! Each key is normalized (`base[capture]` becomes `base` plus a prepended value), split on
//! `.`, checked against the caller's [`PathFilter`], resolved against the [`Registry`] and
//! finally written by the field populator. Keys naming no field are skipped; every other
//! problem aborts the decode with a [`DecodeError`].

#![forbid(unsafe_code)]

use std::time::Instant;

use metrics::{counter, histogram};
use qbind_core::Message;
use qbind_schema::Registry;
use smallvec::SmallVec;
use tracing::{debug, trace};

mod coerce;
mod duration;
mod error;
mod filter;
mod normalize;
mod path;
mod populate;
mod query;
mod render;
mod wellknown;

pub use coerce::{decode_bytes, parse_bool, parse_f32, parse_f64};
pub use duration::{parse_duration, DurationError};
pub use error::{DecodeError, ErrorBody, ErrorKind, MapPart, ScalarError};
pub use filter::PathFilter;
pub use normalize::{normalize_key, NormalizedKey};
pub use query::QueryValues;
pub use render::{format_duration, render_json};

type Segments<'a> = SmallVec<[&'a str; 4]>;

/// Decode `values` into a fresh message of `type_name`. Keys matching `filter` are left alone
/// (typically those already bound from the request path).
pub fn decode(
    values: &QueryValues,
    registry: &Registry,
    type_name: &str,
    filter: &PathFilter,
) -> Result<Message, DecodeError> {
    if registry.message(type_name).is_none() {
        counter!("decode_errors_total", 1u64, "kind" => ErrorKind::UnknownMessageType.as_str());
        return Err(DecodeError::UnknownMessageType(type_name.to_string()));
    }
    let mut msg = Message::new(type_name);
    decode_into(&mut msg, values, registry, filter)?;
    Ok(msg)
}

/// Decode `values` into an existing root. On error the root may hold the keys bound before
/// the failing one; callers reject the whole request.
pub fn decode_into(
    msg: &mut Message,
    values: &QueryValues,
    registry: &Registry,
    filter: &PathFilter,
) -> Result<(), DecodeError> {
    let started = Instant::now();
    counter!("decode_total", 1u64);
    let res = bind_all(msg, values, registry, filter);
    histogram!("decode_ms", started.elapsed().as_secs_f64() * 1000.0);
    match res {
        Ok(stats) => {
            trace!(type_name = %msg.type_name(), params = values.len(), bound = stats.bound, skipped = stats.skipped, "decoded query");
            Ok(())
        }
        Err(e) => {
            counter!("decode_errors_total", 1u64, "kind" => e.kind().as_str());
            debug!(type_name = %msg.type_name(), error = %e, "decode failed");
            Err(e)
        }
    }
}

/// Set the field at dotted `path` from a single raw value.
pub fn populate_field_from_path(
    msg: &mut Message,
    registry: &Registry,
    path: &str,
    value: &str,
) -> Result<(), DecodeError> {
    let segments = split(path);
    bind(msg, registry, &segments, path, &[value.to_string()], false).map(|_| ())
}

#[derive(Debug, Default)]
struct Stats {
    bound: usize,
    skipped: usize,
}

fn bind_all(msg: &mut Message, values: &QueryValues, registry: &Registry, filter: &PathFilter) -> Result<Stats, DecodeError> {
    let mut stats = Stats::default();
    for (key, raw) in values.iter() {
        let key = normalize_key(key, raw);
        let segments = split(&key.path);
        if filter.has_common_prefix(segments.as_slice()) {
            debug!(path = %key.path, "parameter bound elsewhere; skipping");
            counter!("decode_skipped_params_total", 1u64, "reason" => "filtered");
            stats.skipped += 1;
            continue;
        }
        if bind(msg, registry, &segments, &key.path, &key.values, key.bracketed)? {
            stats.bound += 1;
        } else {
            counter!("decode_skipped_params_total", 1u64, "reason" => "unknown_field");
            stats.skipped += 1;
        }
    }
    Ok(stats)
}

/// An empty key splits into one empty segment, which names no field.
fn split(path: &str) -> Segments<'_> {
    path.split('.').collect()
}

/// Returns false when the path names no field.
fn bind(
    msg: &mut Message,
    registry: &Registry,
    segments: &[&str],
    path: &str,
    values: &[String],
    bracketed: bool,
) -> Result<bool, DecodeError> {
    if values.is_empty() {
        return Err(DecodeError::NoValue { path: path.to_string() });
    }
    match path::resolve(msg, registry, segments)? {
        path::Resolved::Field { owner, field } => {
            populate::populate(registry, owner, field, path, values, bracketed)?;
            Ok(true)
        }
        path::Resolved::Skip => Ok(false),
    }
}
