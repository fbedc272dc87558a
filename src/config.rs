use crate::error::Result;
use idmef_converter::{ConvertOptions, MatchPolicy, UnknownNodePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of environment variables layered over the configuration file,
/// e.g. `IDMEF_CONNECTOR__DELIVERY__ENDPOINT`.
pub const ENV_PREFIX: &str = "IDMEF_CONNECTOR";

/// Used when neither the payload nor the configuration names an endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://default-endpoint";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub alert: AlertConfig,
    pub analyzer: AnalyzerConfig,
    pub delivery: DeliveryConfig,
    pub logging: LoggingConfig,
    pub conversion: ConversionConfig,
}

/// Static fields of every generated alert.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub version: String,
    pub organisation_name: String,
    pub organisation_id: String,
    pub priority: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            version: "2.D.V04".to_string(),
            organisation_name: "ElmiSoftware".to_string(),
            organisation_id: "de0fdb525074492eabbf51d1842e43b8".to_string(),
            priority: "Medium".to_string(),
        }
    }
}

/// Describes the SIEM that produced the event.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub name: String,
    pub kind: String,
    pub model: String,
    pub category: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            name: "Splunk".to_string(),
            kind: "Cyber".to_string(),
            model: "Splunk Enterprise".to_string(),
            category: vec!["SIEM".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Fallback endpoint when the payload does not carry `idmefv2_endpoint`.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `env_logger` filter; `RUST_LOG` takes precedence.
    pub level: String,
    /// Append log lines to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Size at which the log file is rotated on startup; zero disables rotation.
    pub max_bytes: u64,
    /// Rotated files kept next to the log file.
    pub backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_bytes: 2_500_000_000,
            backups: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Events missing any of these top-level fields are not converted.
    pub required_fields: Vec<String>,
    /// Remove null members from the generated alert.
    pub strip_nulls: bool,
    pub match_policy: MatchPolicy,
    pub unknown_nodes: UnknownNodePolicy,
}

impl ConversionConfig {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            match_policy: self.match_policy,
            unknown_nodes: self.unknown_nodes,
        }
    }
}

impl Config {
    /// Loads defaults, then `path` (if any), then `IDMEF_CONNECTOR__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("conversion.required_fields")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        log::debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.delivery.timeout_secs)
    }
}
