//! Loose JSON readers shared by every source normalizer.
//!
//! All readers return `None` for absent, null or mistyped input; callers pick
//! the documented default.

use serde_json::Value;

use crate::domain::NOT_AVAILABLE;

/// Wrapping levels of `{"data": {...}}` peeled before reading fields
const MAX_DATA_WRAPS: usize = 2;

/// Strip up to two `data` envelopes
pub fn unwrap_data(value: &Value) -> &Value {
    let mut current = value;
    for _ in 0..MAX_DATA_WRAPS {
        match current.get("data") {
            Some(inner) if inner.is_object() => current = inner,
            _ => break,
        }
    }
    current
}

/// First non-null value among `keys` (canonical name first, then aliases)
pub fn field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = obj.as_object()?;
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// Nested object under any of `keys`
pub fn object<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    field(obj, keys).filter(|v| v.is_object())
}

pub fn as_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn as_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    }
}

pub fn as_u16(value: Option<&Value>) -> Option<u16> {
    as_u64(value).and_then(|n| u16::try_from(n).ok())
}

/// Non-empty text; numbers are rendered, the literal `n/a` counts as absent
pub fn as_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_AVAILABLE) {
        None
    } else {
        Some(text)
    }
}

/// Ordered list of strings; non-text entries are skipped, a non-array is empty
pub fn as_string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| as_text(Some(v))).collect())
        .unwrap_or_default()
}
