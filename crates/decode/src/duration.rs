//! Duration grammars.
//!
//! Two grammars are tried in order:
//! - shorthand: `0`, or `[N y][N w][N d][N h][N m][N s][N ms]` with integer counts, in that
//!   unit order, each unit at most once; yields milliseconds.
//! - unit sequence: optional sign, then one or more `<int>[.<frac>]<unit>` with units
//!   `ns us µs μs ms s m h`; yields nanoseconds and must fit an `i64`.

#![forbid(unsafe_code)]

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration syntax")]
    Syntax,
    #[error("missing unit")]
    MissingUnit,
    #[error("unknown unit {0:?}")]
    UnknownUnit(String),
    #[error("duration out of range")]
    Overflow,
}

const MS_PER_SEC: i64 = 1_000;
const MS_PER_MIN: i64 = 60 * MS_PER_SEC;
const MS_PER_HOUR: i64 = 60 * MS_PER_MIN;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

// Index order is the required unit order.
const SHORTHAND_UNITS: [(&str, i64); 7] = [
    ("y", 365 * MS_PER_DAY),
    ("w", 7 * MS_PER_DAY),
    ("d", MS_PER_DAY),
    ("h", MS_PER_HOUR),
    ("m", MS_PER_MIN),
    ("s", MS_PER_SEC),
    ("ms", 1),
];

/// Parse the shorthand grammar into whole milliseconds.
pub fn parse_shorthand_ms(s: &str) -> Result<i64, DurationError> {
    if s.is_empty() { return Err(DurationError::Empty); }
    if s == "0" { return Ok(0); }
    let mut rest = s;
    let mut next_unit = 0usize;
    let mut total: i64 = 0;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 { return Err(DurationError::Syntax); }
        let n: i64 = rest[..digits].parse().map_err(|_| DurationError::Overflow)?;
        rest = &rest[digits..];
        // "ms" before "m"
        let idx = if rest.starts_with("ms") {
            6
        } else {
            match rest.as_bytes().first() {
                Some(b'y') => 0,
                Some(b'w') => 1,
                Some(b'd') => 2,
                Some(b'h') => 3,
                Some(b'm') => 4,
                Some(b's') => 5,
                Some(_) => return Err(DurationError::Syntax),
                None => return Err(DurationError::MissingUnit),
            }
        };
        if idx < next_unit { return Err(DurationError::Syntax); }
        next_unit = idx + 1;
        let (unit, mult) = SHORTHAND_UNITS[idx];
        let part = n.checked_mul(mult).ok_or(DurationError::Overflow)?;
        total = total.checked_add(part).ok_or(DurationError::Overflow)?;
        rest = &rest[unit.len()..];
    }
    Ok(total)
}

const NANOS_LIMIT: u64 = 1 << 63;

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    })
}

/// Leading decimal integer; `None` on overflow.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    for b in s[..digits].bytes() {
        x = x.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
        if x > NANOS_LIMIT { return None; }
    }
    Some((x, &s[digits..]))
}

/// Fraction digits as (value, scale). Digits past u64 precision are consumed but ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    let mut scale = 1.0f64;
    let mut overflow = false;
    for b in s[..digits].bytes() {
        if overflow { continue; }
        match x.checked_mul(10).and_then(|y| y.checked_add(u64::from(b - b'0'))) {
            Some(y) if y < NANOS_LIMIT => {
                x = y;
                scale *= 10.0;
            }
            _ => overflow = true,
        }
    }
    (x, scale, &s[digits..])
}

/// Parse the unit-sequence grammar into nanoseconds.
pub fn parse_unit_sequence_nanos(orig: &str) -> Result<i64, DurationError> {
    let mut s = orig;
    let mut neg = false;
    if let Some(rest) = s.strip_prefix('-') {
        neg = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" { return Ok(0); }
    if s.is_empty() { return Err(DurationError::Empty); }
    let mut total: u64 = 0;
    while !s.is_empty() {
        if !s.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(DurationError::Syntax);
        }
        let before = s.len();
        let (mut v, rest) = leading_int(s).ok_or(DurationError::Overflow)?;
        let pre = rest.len() != before;
        s = rest;

        let mut frac = (0u64, 1.0f64);
        let mut post = false;
        if let Some(rest) = s.strip_prefix('.') {
            let (f, scale, rest2) = leading_fraction(rest);
            post = rest2.len() != rest.len();
            frac = (f, scale);
            s = rest2;
        }
        if !pre && !post { return Err(DurationError::Syntax); }

        let end = s.find(|c: char| c == '.' || c.is_ascii_digit()).unwrap_or(s.len());
        if end == 0 { return Err(DurationError::MissingUnit); }
        let unit_str = &s[..end];
        let unit = unit_nanos(unit_str).ok_or_else(|| DurationError::UnknownUnit(unit_str.to_string()))?;
        s = &s[end..];

        if v > NANOS_LIMIT / unit { return Err(DurationError::Overflow); }
        v *= unit;
        let (f, scale) = frac;
        if f > 0 {
            v += (f as f64 * (unit as f64 / scale)) as u64;
            if v > NANOS_LIMIT { return Err(DurationError::Overflow); }
        }
        total = total.checked_add(v).ok_or(DurationError::Overflow)?;
        if total > NANOS_LIMIT { return Err(DurationError::Overflow); }
    }
    if neg {
        return Ok(if total == NANOS_LIMIT { i64::MIN } else { -(total as i64) });
    }
    if total > NANOS_LIMIT - 1 { return Err(DurationError::Overflow); }
    Ok(total as i64)
}

/// Parse with the shorthand grammar first, then the unit sequence. Returns (seconds, nanos)
/// with matching signs.
pub fn parse_duration(s: &str) -> Result<(i64, i32), DurationError> {
    match parse_shorthand_ms(s) {
        Ok(ms) => Ok((ms / MS_PER_SEC, ((ms % MS_PER_SEC) * 1_000_000) as i32)),
        Err(_) => {
            let ns = parse_unit_sequence_nanos(s)?;
            Ok((ns / 1_000_000_000, (ns % 1_000_000_000) as i32))
        }
    }
}
