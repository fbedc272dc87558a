//! Normalization helpers applied around conversion: timestamps, URL hosts and null stripping.
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde_json::Value;

/// Formats a timestamp as IDMEF expects it: `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
pub fn format_datetime(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The current UTC time in IDMEF format.
pub fn current_datetime() -> String {
    format_datetime(Utc::now())
}

/// Normalizes epoch seconds (number or numeric string, fractions allowed) or
/// an RFC 3339 string into IDMEF format. Returns `None` for anything else.
pub fn normalize_datetime(value: &Value) -> Option<String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(secs) => from_epoch(secs),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
        _ => None,
    };
    parsed.map(format_datetime)
}

fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let micros = ((secs - whole) * 1_000_000.0).round() as u32;
    DateTime::from_timestamp(whole as i64, micros.min(999_999) * 1_000)
}

/// The host component of `url`, or `"unknown"` when it has none or does not parse.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_matches(['[', ']']).to_lowercase()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Recursively removes object members whose value is `null`.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
