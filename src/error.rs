//! # Error Types
//!
//! Custom error types for the tower-top node using `thiserror`.

use thiserror::Error;

/// Main error type for the tower-top node
#[derive(Debug, Error)]
pub enum TowertopError {
    /// Telemetry framing / protocol errors
    #[error("telemetry protocol error: {0}")]
    Protocol(String),

    /// Analog converter errors (conversion timeout, invalid ranging input)
    #[error("converter error: {0}")]
    Converter(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial port errors
    #[error("serial error: {0}")]
    Serial(String),

    /// No usable serial port among the candidate paths
    #[error("no serial port found (tried: {0})")]
    SerialPortNotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the tower-top node
pub type Result<T> = std::result::Result<T, TowertopError>;
