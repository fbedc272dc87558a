//! Splunk to IDMEFv2 alert connector.
//!
//! A Splunk alert action hands the connector one JSON payload. The payload is
//! flattened and enriched into an event document ([`payload`]), mapped to an
//! IDMEFv2 alert by a compiled template ([`template`], built on
//! `idmef-converter`), and posted to a collector ([`delivery`]).

pub mod classify;
pub mod config;
pub mod connector;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod payload;
pub mod template;

pub use config::Config;
pub use connector::{Connector, MappedAlert};
pub use error::ConnectorError;
pub use payload::{PreparedEvent, prepare_event};

pub use idmef_converter as converter;
pub use idmef_jpath as jpath;
