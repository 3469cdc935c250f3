//! Common error types for the classification service

use thiserror::Error;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the service crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Explicitly requested config file does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}
