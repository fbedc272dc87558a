use idmef_converter::ConverterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConverterError),

    #[error("IDMEF conversion failed: event rejected by admission filter")]
    NotConverted,

    #[error("Delivery error: {0}")]
    Delivery(#[from] reqwest::Error),

    #[error("Endpoint returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
