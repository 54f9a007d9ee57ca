//! Error types for option loading and environment merging.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("options not found")]
    NotFound,

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid option value: {0}")]
    InvalidValue(String),

    #[error("invalid override layer for environment '{env}': {message}")]
    InvalidEnvOverride { env: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
