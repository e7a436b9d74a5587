#![forbid(unsafe_code)]

use once_cell::sync::Lazy;
use regex::Regex;

/// `base[capture]`, exactly one bracket pair.
static BRACKET_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^\[\]]*)\[([^\[\]]*)\]$").expect("bracket key pattern"));

/// A query key after bracket rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedKey {
    pub path: String,
    pub values: Vec<String>,
    /// The key used `base[capture]` syntax; the capture is `values[0]`.
    pub bracketed: bool,
}

/// Rewrite `base[capture]` into `base` with the capture prepended to the values.
/// Whether the capture is a list element or a map key is left to the schema.
pub fn normalize_key(key: &str, values: &[String]) -> NormalizedKey {
    match BRACKET_KEY.captures(key) {
        Some(caps) => {
            let base = caps.get(1).map_or("", |m| m.as_str());
            let capture = caps.get(2).map_or("", |m| m.as_str());
            let mut out = Vec::with_capacity(values.len() + 1);
            out.push(capture.to_string());
            out.extend(values.iter().cloned());
            NormalizedKey { path: base.to_string(), values: out, bracketed: true }
        }
        None => NormalizedKey { path: key.to_string(), values: values.to_vec(), bracketed: false },
    }
}
