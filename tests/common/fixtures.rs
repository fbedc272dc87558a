use serde_json::{Value, json};

/// A Splunk alert-action payload for a failed SSH login.
pub fn failed_login_payload() -> Value {
    json!({
        "app": "search",
        "owner": "admin",
        "sid": "scheduler__admin__search__RMD5_at_1709296205_42",
        "search_name": "SSH failures",
        "server_uri": "https://splunk.example.org:8089",
        "server_host": "splunk01",
        "results_link": "https://splunk.example.org/app/search/@go?sid=42",
        "configuration": {
            "idmefv2_endpoint": "http://127.0.0.1:9/alerts"
        },
        "result": {
            "_raw": "Mar  1 12:30:05 web01 sshd[2211]: Failed password for invalid user admin from 203.0.113.7 port 51122 ssh2",
            "_time": "1709296205",
            "host": "web01",
            "ip": "203.0.113.7",
            "user": "admin",
            "port": 51122
        }
    })
}

/// A payload with no result and no configuration.
pub fn empty_payload() -> Value {
    json!({})
}

/// A CrowdStrike-style detection summary, as read by `templates/detection.json`.
pub fn detection() -> Value {
    json!({
        "cid": "0c5f8e0ea6bb4d3a9b2b0c5c7e1d2f3a",
        "created_timestamp": "2024-03-01T12:30:05.123456Z",
        "first_behavior": 1709296100,
        "max_severity_displayname": "High",
        "behaviors": [
            { "display_name": "MalwareDropper", "description": "Malware dropped by a macro" },
            { "display_name": "Other", "description": "Secondary behavior" }
        ],
        "device": {
            "hostname": "laptop-042",
            "os_version": "Windows 11",
            "local_ip": "192.168.1.42",
            "external_ip": "198.51.100.10"
        }
    })
}
