//! Heuristics that derive IDMEF fields from the raw event text.
use serde_json::Value;

/// Category used when no rule matches.
pub const UNDETERMINED: &str = "Other.Undetermined";

/// Substring rules, checked in order; the first hit wins.
const CATEGORY_RULES: &[(&str, &str)] = &[
    ("failed password", "Attempt.Login"),
    ("accepted password", "Information.LoginSuccess"),
    ("invalid user", "Information.UnauthorizedAccess"),
    ("sudo", "Intrusion.AdminCompromise"),
    ("brute force", "BruteForce-SSH"),
    ("scan", "Recon.Scanning"),
    ("malware", "Malicious.System"),
    ("ddos", "Availability.DDoS"),
];

const SERVICE_RULES: &[(&str, &str)] = &[("sshd", "SSH"), ("httpd", "HTTP")];

/// Lowercased event text: the `_raw` member of an object, or the value itself.
fn event_text(data: &Value) -> String {
    match data {
        Value::Object(map) => match map.get("_raw") {
            Some(Value::String(raw)) => raw.to_lowercase(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string().to_lowercase(),
        },
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

/// Determines the IDMEF category of an event, e.g. `Attempt.Login` for a failed login.
pub fn classify_event(data: &Value) -> &'static str {
    let text = event_text(data);
    CATEGORY_RULES
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map_or(UNDETERMINED, |(_, category)| *category)
}

/// Guesses the targeted service from the event text.
pub fn extract_service(data: &Value) -> &'static str {
    let text = event_text(data);
    SERVICE_RULES
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map_or("Unknown", |(_, service)| *service)
}
