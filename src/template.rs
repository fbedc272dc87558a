//! The built-in IDMEFv2 alert template and the functions templates may call.
use crate::classify::{classify_event, extract_service};
use crate::config::Config;
use crate::normalize::{current_datetime, host_of, normalize_datetime};
use idmef_converter::{Arity, FunctionError, FunctionRef, FunctionRegistry, RawTemplate};
use serde_json::{Value, json};

fn first_arg(name: &str, args: &[Value]) -> Result<Value, FunctionError> {
    args.first()
        .cloned()
        .ok_or_else(|| FunctionError::new(format!("{} expects an argument", name)))
}

pub fn now() -> FunctionRef {
    FunctionRef::new("now", Arity::Exact(0), |_| Ok(json!(current_datetime())))
}

pub fn uuid() -> FunctionRef {
    FunctionRef::new("uuid", Arity::Exact(0), |_| {
        Ok(json!(::uuid::Uuid::new_v4().to_string()))
    })
}

pub fn host() -> FunctionRef {
    FunctionRef::new("host_of", Arity::Exact(1), |args| {
        match first_arg("host_of", &args)? {
            Value::String(url) => Ok(json!(host_of(&url))),
            _ => Ok(json!("unknown")),
        }
    })
}

pub fn classify() -> FunctionRef {
    FunctionRef::new("classify", Arity::Exact(1), |args| {
        Ok(json!(classify_event(&first_arg("classify", &args)?)))
    })
}

pub fn service() -> FunctionRef {
    FunctionRef::new("service", Arity::Exact(1), |args| {
        Ok(json!(extract_service(&first_arg("service", &args)?)))
    })
}

pub fn datetime() -> FunctionRef {
    FunctionRef::new("datetime", Arity::Exact(1), |args| {
        let value = first_arg("datetime", &args)?;
        normalize_datetime(&value)
            .map(Value::String)
            .ok_or_else(|| FunctionError::new(format!("cannot interpret {} as a datetime", value)))
    })
}

/// The generic built-ins plus the connector's own functions.
pub fn connector_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::with_builtins();
    for function in [now(), uuid(), host(), classify(), service(), datetime()] {
        registry.register(function);
    }
    registry
}

/// The default Splunk to IDMEFv2 template. Paths refer to the document built by
/// [`crate::payload::prepare_event`].
pub fn alert_template(config: &Config) -> RawTemplate {
    let alert = &config.alert;
    let analyzer = &config.analyzer;
    let host = host();
    let now = now();

    RawTemplate::object([
        ("Version", json!(alert.version).into()),
        ("ID", "$.sid".into()),
        ("OrganisationName", json!(alert.organisation_name).into()),
        ("OrganizationId", json!(alert.organisation_id).into()),
        ("Description", "$._raw".into()),
        ("Priority", json!(alert.priority).into()),
        ("CreateTime", RawTemplate::Function(now.clone())),
        ("StartTime", RawTemplate::Function(now)),
        (
            "Category",
            RawTemplate::array([RawTemplate::call(classify(), ["$._raw".into()])]),
        ),
        (
            "Analyzer",
            RawTemplate::object([
                ("Name", json!(analyzer.name).into()),
                ("Hostname", "$.server_uri".into()),
                ("Type", json!(analyzer.kind).into()),
                ("Model", json!(analyzer.model).into()),
                ("Category", json!(analyzer.category).into()),
                ("IP", RawTemplate::call(host.clone(), ["$.server_uri".into()])),
            ]),
        ),
        (
            "Source",
            RawTemplate::array([RawTemplate::object([
                ("IP", "$.ip".into()),
                ("User", "$.user".into()),
                ("Port", "$.port".into()),
            ])]),
        ),
        (
            "Target",
            RawTemplate::array([RawTemplate::object([
                ("IP", RawTemplate::call(host, ["$.server_uri".into()])),
                ("Service", "$.target_service".into()),
                ("Port", "$.port".into()),
            ])]),
        ),
    ])
}
