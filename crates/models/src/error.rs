use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Unknown resource kind: {0}")]
    UnknownResource(String),

    #[error("Unknown tenant status: {0}")]
    UnknownStatus(String),

    #[error("Invalid plan limit for {key}: {value}")]
    InvalidLimit { key: String, value: String },
}
