//! Turns a Splunk alert-action payload into the flat event document the
//! alert template is written against.
use crate::classify::{classify_event, extract_service};
use crate::error::{ConnectorError, Result};
use serde_json::{Map, Value, json};

/// Fields the template relies on, with the value used when they are missing or empty.
pub fn required_defaults() -> [(&'static str, Value); 6] {
    [
        ("sid", json!("unknown")),
        ("server_uri", json!("unknown")),
        ("ip", json!("0.0.0.0")),
        ("user", json!("unknown")),
        ("host", json!("unknown")),
        ("port", json!(0)),
    ]
}

/// The event document handed to the converter, plus the endpoint the
/// payload asked to deliver to.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEvent {
    pub document: Value,
    pub endpoint: Option<String>,
}

/// `null`, `false`, zero, and empty strings, arrays and objects.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Merges the payload's `result` with its top-level fields, derives the
/// category and target service, and fills in required fields.
pub fn prepare_event(payload: Value) -> Result<PreparedEvent> {
    let Value::Object(mut payload) = payload else {
        return Err(ConnectorError::InvalidPayload(
            "payload must be a JSON object".to_string(),
        ));
    };

    let mut event = match payload.remove("result") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(result)) => result,
        Some(other) => {
            return Err(ConnectorError::InvalidPayload(format!(
                "'result' must be an object, got {}",
                other
            )));
        }
    };
    log::info!("Received result: {}", Value::Object(event.clone()));

    let raw = event.entry("_raw").or_insert_with(|| json!("")).clone();
    event.insert("idmef_category".to_string(), json!(classify_event(&raw)));
    event.insert("target_service".to_string(), json!(extract_service(&raw)));

    let configuration = match payload.get("configuration") {
        Some(Value::Object(cfg)) => Value::Object(cfg.clone()),
        _ => json!({}),
    };
    let endpoint = configuration
        .get("idmefv2_endpoint")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    for (key, value) in payload {
        event.insert(key, value);
    }

    for (field, default) in required_defaults() {
        if event.get(field).is_none_or(is_falsy) {
            log::warn!("Missing field '{}', defaulting to '{}'", field, default);
            event.insert(field.to_string(), default);
        }
    }

    event.insert("configuration".to_string(), configuration);

    Ok(PreparedEvent {
        document: Value::Object(event),
        endpoint,
    })
}
