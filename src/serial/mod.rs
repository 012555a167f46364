//! # Serial Communication Module
//!
//! Telemetry downlink over the node's serial port.
//!
//! This module handles:
//! - Opening the downlink port at the configured baud rate (8N1)
//! - Auto-detecting the device across common paths
//! - Transmitting one rendered telemetry line per acquisition cycle

pub mod sink;

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{Result, TowertopError};
use sink::TelemetrySink;

/// Default downlink device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // USB CDC devices
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// Telemetry downlink serial port handler.
pub struct TelemetrySerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
}

impl std::fmt::Debug for TelemetrySerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl TelemetrySerial {
    /// Open the downlink port.
    ///
    /// Tries the configured path first, then the common fallbacks.
    ///
    /// # Errors
    ///
    /// Returns error if no candidate device can be opened
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let mut paths: Vec<&str> = vec![config.port.as_str()];
        paths.extend(
            DEFAULT_DEVICE_PATHS
                .iter()
                .copied()
                .filter(|&p| p != config.port),
        );
        Self::open_with_paths(&paths, config.baud_rate, config.timeout_ms)
    }

    /// Open the downlink port from an explicit list of candidate paths
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate, timeout_ms) {
                Ok(port) => {
                    info!("Successfully opened telemetry port at {}", path);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(TowertopError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1 framing
    fn open_port(path: &str, baud_rate: u32, timeout_ms: u64) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .open_native_async()
            .map_err(|e| TowertopError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Send one rendered telemetry line
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        self.port
            .write_all(line.as_bytes())
            .await
            .map_err(|e| TowertopError::Serial(format!("Failed to write frame: {}", e)))?;

        self.port
            .flush()
            .await
            .map_err(|e| TowertopError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent telemetry frame ({} bytes)", line.len());
        Ok(())
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl TelemetrySink for TelemetrySerial {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.port.write_all(line.as_bytes()).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.port.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_path_order() {
        assert_eq!(DEFAULT_DEVICE_PATHS.len(), 2);
        assert_eq!(DEFAULT_DEVICE_PATHS[0], "/dev/ttyACM0");
        assert_eq!(DEFAULT_DEVICE_PATHS[1], "/dev/ttyUSB0");
    }

    #[test]
    fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];
        let result = TelemetrySerial::open_with_paths(invalid_paths, 500_000, 100);

        assert!(result.is_err());
        match result.unwrap_err() {
            TowertopError::SerialPortNotFound(msg) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            other => panic!("Expected SerialPortNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_with_empty_paths_returns_error() {
        let empty_paths: &[&str] = &[];
        let result = TelemetrySerial::open_with_paths(empty_paths, 500_000, 100);

        assert!(matches!(
            result,
            Err(TowertopError::SerialPortNotFound(_))
        ));
    }

    #[test]
    fn test_open_port_with_invalid_path_returns_error() {
        let result =
            TelemetrySerial::open_port("/dev/nonexistent_serial_device_12345", 500_000, 100);

        assert!(result.is_err());
        match result.unwrap_err() {
            TowertopError::Serial(msg) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_puts_configured_path_first() {
        let config = SerialConfig {
            port: "/dev/nonexistent_configured".to_string(),
            baud_rate: 500_000,
            timeout_ms: 100,
        };

        // All candidates fail on a bench host without the port; the error
        // message must list the configured path ahead of the fallbacks.
        if let Err(TowertopError::SerialPortNotFound(msg)) = TelemetrySerial::open(&config) {
            assert!(msg.starts_with("/dev/nonexistent_configured"));
        }
    }
}
