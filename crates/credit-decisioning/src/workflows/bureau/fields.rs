use chrono::NaiveDate;
use serde_json::Value;

/// Stand-in for absent blocks so lookups can chain without branching.
pub(crate) static NULL: Value = Value::Null;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d", "%d%m%Y"];

/// Non-empty, trimmed text at `key`. Numbers are rendered as text since bureaus
/// are inconsistent about quoting codes.
pub(crate) fn text<'a>(value: &'a Value, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match value.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then_some(std::borrow::Cow::Borrowed(trimmed))
        }
        Value::Number(n) => Some(std::borrow::Cow::Owned(n.to_string())),
        _ => None,
    }
}

pub(crate) fn text_or(value: &Value, key: &str, default: &str) -> String {
    text(value, key)
        .map(|s| s.into_owned())
        .unwrap_or_else(|| default.to_string())
}

/// First non-empty text among `keys`, in priority order.
pub(crate) fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| text(value, key))
        .map(|s| s.into_owned())
}

/// First value among `keys` that is present and not null.
pub(crate) fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|candidate| !candidate.is_null())
}

/// Outcome of reading a numeric field that may be missing, blank, or garbage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Amount {
    Absent,
    Present(f64),
    Invalid,
}

pub(crate) fn amount(value: &Value, key: &str) -> Amount {
    match value.get(key) {
        None | Some(Value::Null) => Amount::Absent,
        Some(Value::Number(n)) => n.as_f64().map(Amount::Present).unwrap_or(Amount::Invalid),
        Some(Value::String(s)) => parse_amount_text(s),
        Some(_) => Amount::Invalid,
    }
}

fn parse_amount_text(raw: &str) -> Amount {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('\u{20b9}')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Amount::Absent;
    }
    match cleaned.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Amount::Present(parsed),
        _ => Amount::Invalid,
    }
}

/// Amount clamped to zero; `Err` carries the offending field name.
pub(crate) fn money(value: &Value, keys: &[&str]) -> Result<f64, String> {
    for key in keys {
        match amount(value, key) {
            Amount::Present(parsed) => return Ok(parsed.max(0.0)),
            Amount::Invalid => return Err(format!("invalid {key}")),
            Amount::Absent => continue,
        }
    }
    Ok(0.0)
}

/// Optional amount: `None` when the field is absent or unreadable, `Some(0.0)`
/// for a reported zero.
pub(crate) fn optional_money(value: &Value, key: &str) -> Option<f64> {
    match amount(value, key) {
        Amount::Present(parsed) => Some(parsed.max(0.0)),
        Amount::Absent | Amount::Invalid => None,
    }
}

pub(crate) fn flag(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" | "open" => Some(true),
            "no" | "n" | "false" | "0" | "closed" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

pub(crate) fn date(value: &Value, keys: &[&str]) -> Option<NaiveDate> {
    keys.iter()
        .find_map(|key| text(value, key).and_then(|raw| parse_date(&raw)))
}

/// Array at the first of `keys` that holds one; a lone object is treated as a
/// single-element list.
pub(crate) fn list<'a>(value: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    match first_present(value, keys) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(object @ Value::Object(_)) => vec![object],
        _ => Vec::new(),
    }
}
