use crate::config::{Config, DEFAULT_ENDPOINT};
use crate::delivery::AlertSender;
use crate::error::{ConnectorError, Result};
use crate::normalize::strip_nulls;
use crate::payload::prepare_event;
use crate::template::{alert_template, connector_functions};
use idmef_converter::{Converter, RequireFields};
use serde_json::Value;
use std::path::Path;

/// An alert ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedAlert {
    pub message: Value,
    pub endpoint: String,
}

/// Prepares, converts and delivers Splunk alert payloads.
#[derive(Debug, Clone)]
pub struct Connector {
    config: Config,
    converter: Converter,
    sender: AlertSender,
}

impl Connector {
    /// A connector using the built-in alert template.
    pub fn new(config: Config) -> Result<Self> {
        let converter = Converter::from_raw(&alert_template(&config))?;
        Self::with_converter(config, converter)
    }

    /// A connector using a JSON template. Computed values may call any
    /// function of [`connector_functions`].
    pub fn with_template(config: Config, template: &Value) -> Result<Self> {
        let converter = Converter::from_json(template, &connector_functions())?;
        Self::with_converter(config, converter)
    }

    /// Reads a JSON template from `path`.
    pub fn with_template_file(config: Config, path: &Path) -> Result<Self> {
        log::info!("Loading template from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        let template: Value = serde_json::from_str(&source)?;
        Self::with_template(config, &template)
    }

    fn with_converter(config: Config, converter: Converter) -> Result<Self> {
        let mut converter = converter.with_options(config.conversion.options());
        if !config.conversion.required_fields.is_empty() {
            converter = converter.with_filter(RequireFields::new(
                config.conversion.required_fields.iter().cloned(),
            ));
        }
        let sender = AlertSender::new(config.timeout())?;
        Ok(Self {
            config,
            converter,
            sender,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Turns a raw alert-action payload into an IDMEFv2 message and its destination.
    pub fn map_event(&self, payload: Value) -> Result<MappedAlert> {
        let prepared = prepare_event(payload)?;
        let endpoint = prepared
            .endpoint
            .or_else(|| self.config.delivery.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let conversion = self.converter.convert(&prepared.document).inspect_err(|e| {
            log::error!("Conversion error: {}", e);
        })?;
        if !conversion.applied {
            return Err(ConnectorError::NotConverted);
        }

        let message = if self.config.conversion.strip_nulls {
            strip_nulls(conversion.document)
        } else {
            conversion.document
        };
        log::info!("Generated IDMEF message: {}", message);
        Ok(MappedAlert { message, endpoint })
    }

    /// Maps `payload` and posts the result. With `dry_run` the alert is only returned.
    pub async fn process(&self, payload: Value, dry_run: bool) -> Result<MappedAlert> {
        let alert = self.map_event(payload)?;
        if dry_run {
            log::info!("Dry run, alert for {} not sent", alert.endpoint);
        } else {
            self.sender.send(&alert.message, &alert.endpoint).await?;
        }
        Ok(alert)
    }
}
