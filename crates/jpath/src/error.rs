use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JPathError {
    #[error("Path parse error in '{0}': {1}")]
    JPathParse(String, String),

    #[error("Path '{0}' must start with '$'")]
    MissingRoot(String),

    #[error("Slice step cannot be zero in '{0}'")]
    ZeroStep(String),
}
