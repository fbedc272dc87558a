mod common;

use common::fixtures::*;
use common::{TestResult, assert_idmef_datetime, default_connector, one_shot_collector};
use idmef_connector::normalize::strip_nulls;
use idmef_connector::{Config, Connector, ConnectorError, prepare_event};
use serde_json::json;
use std::io::Write;
use std::path::Path;

#[test]
fn test_failed_login_maps_to_alert() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let alert = default_connector().map_event(failed_login_payload())?;
    let message = &alert.message;

    assert_eq!(alert.endpoint, "http://127.0.0.1:9/alerts");
    assert_eq!(message["Version"], "2.D.V04");
    assert_eq!(message["ID"], "scheduler__admin__search__RMD5_at_1709296205_42");
    assert_eq!(message["OrganisationName"], "ElmiSoftware");
    assert_eq!(message["Priority"], "Medium");
    assert_eq!(message["Category"], json!(["Attempt.Login"]));
    assert_idmef_datetime(&message["CreateTime"]);
    assert_idmef_datetime(&message["StartTime"]);

    let analyzer = &message["Analyzer"];
    assert_eq!(analyzer["Name"], "Splunk");
    assert_eq!(analyzer["Hostname"], "https://splunk.example.org:8089");
    assert_eq!(analyzer["IP"], "splunk.example.org");
    assert_eq!(analyzer["Category"], json!(["SIEM"]));

    assert_eq!(
        message["Source"],
        json!([{ "IP": "203.0.113.7", "User": "admin", "Port": 51122 }])
    );
    assert_eq!(
        message["Target"],
        json!([{ "IP": "splunk.example.org", "Service": "SSH", "Port": 51122 }])
    );
    Ok(())
}

#[test]
fn test_alert_member_order_follows_template() -> TestResult {
    let alert = default_connector().map_event(failed_login_payload())?;
    let keys: Vec<&str> = alert
        .message
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(
        keys,
        [
            "Version",
            "ID",
            "OrganisationName",
            "OrganizationId",
            "Description",
            "Priority",
            "CreateTime",
            "StartTime",
            "Category",
            "Analyzer",
            "Source",
            "Target"
        ]
    );
    Ok(())
}

#[test]
fn test_empty_payload_uses_defaults() -> TestResult {
    let alert = default_connector().map_event(empty_payload())?;
    let message = &alert.message;

    assert_eq!(alert.endpoint, "http://default-endpoint");
    assert_eq!(message["ID"], "unknown");
    assert_eq!(message["Description"], "");
    assert_eq!(message["Category"], json!(["Other.Undetermined"]));
    assert_eq!(message["Analyzer"]["IP"], "unknown");
    assert_eq!(message["Source"][0]["IP"], "0.0.0.0");
    assert_eq!(message["Source"][0]["Port"], 0);
    assert_eq!(message["Target"][0]["Service"], "Unknown");
    Ok(())
}

#[test]
fn test_configured_endpoint_is_fallback_only() -> TestResult {
    let mut config = Config::default();
    config.delivery.endpoint = Some("http://collector.internal:9999/".to_string());
    let connector = Connector::new(config)?;

    let from_payload = connector.map_event(failed_login_payload())?;
    assert_eq!(from_payload.endpoint, "http://127.0.0.1:9/alerts");

    let fallback = connector.map_event(empty_payload())?;
    assert_eq!(fallback.endpoint, "http://collector.internal:9999/");
    Ok(())
}

#[test]
fn test_alert_config_feeds_template() -> TestResult {
    let mut config = Config::default();
    config.alert.priority = "High".to_string();
    config.analyzer.name = "Splunk Cloud".to_string();
    let alert = Connector::new(config)?.map_event(failed_login_payload())?;

    assert_eq!(alert.message["Priority"], "High");
    assert_eq!(alert.message["Analyzer"]["Name"], "Splunk Cloud");
    Ok(())
}

#[test]
fn test_invalid_payload_is_rejected() {
    let connector = default_connector();
    assert!(matches!(
        connector.map_event(json!(["not", "an", "object"])),
        Err(ConnectorError::InvalidPayload(_))
    ));
    assert!(matches!(
        connector.map_event(json!({ "result": "text" })),
        Err(ConnectorError::InvalidPayload(_))
    ));
}

#[test]
fn test_required_fields_gate_conversion() -> TestResult {
    let mut config = Config::default();
    config.conversion.required_fields = vec!["search_name".to_string()];
    let connector = Connector::new(config)?;

    assert!(connector.map_event(failed_login_payload()).is_ok());
    assert!(matches!(
        connector.map_event(empty_payload()),
        Err(ConnectorError::NotConverted)
    ));
    Ok(())
}

#[test]
fn test_strip_nulls_option() -> TestResult {
    let template = json!({ "ID": "$.sid", "Missing": null, "Nested": { "Gone": null } });

    let keep = Connector::with_template(Config::default(), &template)?;
    let message = keep.map_event(failed_login_payload())?.message;
    assert!(message["Missing"].is_null());
    assert!(message.as_object().is_some_and(|o| o.contains_key("Missing")));

    let mut config = Config::default();
    config.conversion.strip_nulls = true;
    let strip = Connector::with_template(config, &template)?;
    let message = strip.map_event(failed_login_payload())?.message;
    assert_eq!(message, json!({ "ID": "scheduler__admin__search__RMD5_at_1709296205_42", "Nested": {} }));
    Ok(())
}

#[test]
fn test_strip_nulls_recurses_into_arrays() {
    let stripped = strip_nulls(json!({ "a": null, "b": [ { "c": null, "d": 1 }, null ] }));
    assert_eq!(stripped, json!({ "b": [ { "d": 1 }, null ] }));
}

#[test]
fn test_detection_template_file() -> TestResult {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/detection.json");
    let connector = Connector::with_template_file(Config::default(), &path)?;

    let conversion = connector.converter().convert(&detection())?;
    assert!(conversion.applied);
    let message = conversion.document;

    assert_eq!(message["ID"], "0c5f8e0ea6bb4d3a9b2b0c5c7e1d2f3a");
    assert_eq!(message["Description"], "Malware dropped by a macro");
    assert_eq!(message["Priority"], "High");
    assert_eq!(message["CreateTime"], "2024-03-01T12:30:05.123456Z");
    assert_eq!(message["StartTime"], "2024-03-01T12:28:20.000000Z");
    assert_eq!(message["Category"], json!(["Malicious.System"]));
    assert_eq!(message["Analyzer"]["Name"], "MalwareDropper");
    assert_eq!(message["Analyzer"]["Category"], json!(["EDR"]));
    assert_eq!(message["Source"][0]["IP"], "192.168.1.42");
    assert_eq!(message["Target"][0]["IP"], "198.51.100.10");
    Ok(())
}

#[test]
fn test_missing_path_is_conversion_error() -> TestResult {
    let template = json!({ "ID": "$.no_such_field" });
    let connector = Connector::with_template(Config::default(), &template)?;
    let err = connector.map_event(failed_login_payload()).unwrap_err();
    assert!(matches!(err, ConnectorError::Conversion(_)));
    Ok(())
}

#[test]
fn test_template_with_unknown_function_fails() {
    let template = json!({ "ID": { "$call": "no_such_function", "args": [] } });
    let err = Connector::with_template(Config::default(), &template).unwrap_err();
    assert!(matches!(err, ConnectorError::Conversion(_)));
}

#[test]
fn test_missing_template_file_is_io_error() {
    let err = Connector::with_template_file(Config::default(), Path::new("/nonexistent/template.json"))
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Io(_)));
}

#[test]
fn test_config_file_layers_over_defaults() -> TestResult {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
[alert]
priority = "Low"

[delivery]
endpoint = "http://10.1.2.3:9999/"
timeout_secs = 5

[conversion]
strip_nulls = true
match_policy = "collect"
"#
    )?;

    let config = Config::load(Some(file.path()))?;
    assert_eq!(config.alert.priority, "Low");
    assert_eq!(config.alert.version, "2.D.V04");
    assert_eq!(config.analyzer.name, "Splunk");
    assert_eq!(config.delivery.endpoint.as_deref(), Some("http://10.1.2.3:9999/"));
    assert_eq!(config.timeout().as_secs(), 5);
    assert!(config.conversion.strip_nulls);
    assert_eq!(
        config.conversion.options().match_policy,
        idmef_connector::converter::MatchPolicy::Collect
    );
    Ok(())
}

#[test]
fn test_missing_config_file_is_error() {
    let err = Config::load(Some(Path::new("/nonexistent/connector.toml"))).unwrap_err();
    assert!(matches!(err, ConnectorError::Config(_)));
}

#[test]
fn test_prepare_event_keeps_payload_fields() -> TestResult {
    let prepared = prepare_event(failed_login_payload())?;
    assert_eq!(prepared.document["search_name"], "SSH failures");
    assert_eq!(prepared.document["host"], "web01");
    assert_eq!(prepared.document["idmef_category"], "Attempt.Login");
    Ok(())
}

#[tokio::test]
async fn test_dry_run_does_not_send() -> TestResult {
    let alert = default_connector().process(failed_login_payload(), true).await?;
    assert_eq!(alert.message["Target"][0]["Service"], "SSH");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_collector_is_delivery_error() -> TestResult {
    let mut payload = failed_login_payload();
    payload["configuration"]["idmefv2_endpoint"] = json!("http://127.0.0.1:1/");

    let mut config = Config::default();
    config.delivery.timeout_secs = 2;
    let err = Connector::new(config)?.process(payload, false).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Delivery(_)));
    Ok(())
}

#[tokio::test]
async fn test_non_200_status_is_rejected_with_body() -> TestResult {
    let (url, server) = one_shot_collector("500 Internal Server Error", "collector down").await?;
    let mut payload = failed_login_payload();
    payload["configuration"]["idmefv2_endpoint"] = json!(url);

    let err = default_connector().process(payload, false).await.unwrap_err();
    match err {
        ConnectorError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "collector down");
        }
        other => panic!("expected a rejection, got {}", other),
    }
    server.await??;
    Ok(())
}

#[tokio::test]
async fn test_200_status_delivers_alert_json() -> TestResult {
    let (url, server) = one_shot_collector("200 OK", "").await?;
    let mut payload = failed_login_payload();
    payload["configuration"]["idmefv2_endpoint"] = json!(url.clone());

    let alert = default_connector().process(payload, false).await?;
    assert_eq!(alert.endpoint, url);

    let received: serde_json::Value = serde_json::from_str(&server.await??)?;
    assert_eq!(received, alert.message);
    Ok(())
}

#[tokio::test]
async fn test_201_status_is_not_success() -> TestResult {
    let (url, server) = one_shot_collector("201 Created", "created").await?;
    let mut payload = failed_login_payload();
    payload["configuration"]["idmefv2_endpoint"] = json!(url);

    let err = default_connector().process(payload, false).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Rejected { status: 201, .. }));
    server.await??;
    Ok(())
}
