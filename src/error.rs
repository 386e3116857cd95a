// Error types for the analog clock widget
//
// This module defines error types using thiserror. Faults the element is
// expected to tolerate (missing client capability, malformed payloads) are
// logged where they happen and never surface through these types.

use thiserror::Error;

/// Main error type for element operations
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Invalid custom element name: '{0}'")]
    InvalidTagName(String),

    #[error("Custom element not defined: '{0}'")]
    UndefinedElement(String),

    #[error("Timer scheduling failed: {0}")]
    Scheduler(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Client command not supported: {0}")]
    UnsupportedCommand(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

// Convenience type aliases for common Result types
pub type Result<T> = std::result::Result<T, WidgetError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
