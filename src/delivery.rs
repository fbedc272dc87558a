//! Delivers generated alerts to an IDMEFv2 collector over HTTP.
use crate::error::{ConnectorError, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Posts alerts as JSON. Only `200 OK` counts as delivered.
#[derive(Debug, Clone)]
pub struct AlertSender {
    client: Client,
}

impl AlertSender {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub async fn send(&self, alert: &Value, endpoint: &str) -> Result<()> {
        log::debug!("Posting alert to {}", endpoint);
        let response = self.client.post(endpoint).json(alert).send().await?;

        let status = response.status();
        if status == StatusCode::OK {
            log::info!("Alert has been sent to IDMEFv2 server at {}", endpoint);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ConnectorError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
