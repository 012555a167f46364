//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub analog: AnalogConfig,
}

/// Telemetry serial output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_serial_timeout_ms")]
    pub timeout_ms: u64,
}

/// Acquisition cycle configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AcquisitionConfig {
    /// Cycle period in milliseconds (one telemetry line per cycle)
    #[serde(default = "default_cycle_period_ms")]
    pub cycle_period_ms: u64,

    /// Moving-average length for the analog channels
    #[serde(default = "default_filter_length")]
    pub filter_length: usize,

    /// Number of cycles between periodic status log lines
    #[serde(default = "default_log_interval_cycles")]
    pub log_interval_cycles: u64,
}

/// Angle-sensor link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// Poll iterations before a byte read is declared timed out.
    ///
    /// Consumed by hardware [`SsiBus`](crate::hal::SsiBus) implementations;
    /// the bench rig models the timeout's observable effects directly.
    #[serde(default = "default_read_timeout_polls")]
    pub read_timeout_polls: u32,

    /// Consecutive timeouts before the sticky error flag latches
    #[serde(default = "default_error_latch_count")]
    pub error_latch_count: u8,
}

/// Analog front-end scaling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AnalogConfig {
    /// Fixed reference for the voltage channel, in millivolts
    #[serde(default = "default_vref_mv")]
    pub vref_mv: u32,

    /// Low reference used for the supply-rail estimate, in millivolts
    #[serde(default = "default_rail_ref_mv")]
    pub rail_ref_mv: u32,

    /// Resistive divider ratio on the supply-sense input
    #[serde(default = "default_rail_divider")]
    pub rail_divider: u32,

    /// Nominal supply rail for the current sensor, in millivolts
    #[serde(default = "default_rail_nominal_mv")]
    pub rail_nominal_mv: u32,

    /// Current-sensor sensitivity at the nominal rail, in mV per ampere
    #[serde(default = "default_sensitivity_mv_per_a")]
    pub sensitivity_mv_per_a: u32,

    /// Resistive divider ratio on the panel-voltage input
    #[serde(default = "default_panel_divider")]
    pub panel_divider: u32,

    /// Upper bound on a single conversion before it is declared failed.
    ///
    /// Consumed by hardware [`AdcConverter`](crate::hal::AdcConverter)
    /// implementations; the bench rig reports sequencing errors instead of
    /// waiting.
    #[serde(default = "default_conversion_timeout_ms")]
    pub conversion_timeout_ms: u64,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 500_000 }
fn default_serial_timeout_ms() -> u64 { 100 }

fn default_cycle_period_ms() -> u64 { 100 }
fn default_filter_length() -> usize { 50 }
fn default_log_interval_cycles() -> u64 { 100 }

fn default_read_timeout_polls() -> u32 { 40_000 }
fn default_error_latch_count() -> u8 { 10 }

fn default_vref_mv() -> u32 { 4096 }
fn default_rail_ref_mv() -> u32 { 1024 }
fn default_rail_divider() -> u32 { 6 }
fn default_rail_nominal_mv() -> u32 { 5000 }
fn default_sensitivity_mv_per_a() -> u32 { 100 }
fn default_panel_divider() -> u32 { 11 }
fn default_conversion_timeout_ms() -> u64 { 5 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_serial_timeout_ms(),
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            cycle_period_ms: default_cycle_period_ms(),
            filter_length: default_filter_length(),
            log_interval_cycles: default_log_interval_cycles(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_timeout_polls: default_read_timeout_polls(),
            error_latch_count: default_error_latch_count(),
        }
    }
}

impl Default for AnalogConfig {
    fn default() -> Self {
        Self {
            vref_mv: default_vref_mv(),
            rail_ref_mv: default_rail_ref_mv(),
            rail_divider: default_rail_divider(),
            rail_nominal_mv: default_rail_nominal_mv(),
            sensitivity_mv_per_a: default_sensitivity_mv_per_a(),
            panel_divider: default_panel_divider(),
            conversion_timeout_ms: default_conversion_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            acquisition: AcquisitionConfig::default(),
            link: LinkConfig::default(),
            analog: AnalogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if ![115_200, 230_400, 460_800, 500_000, 921_600].contains(&self.serial.baud_rate) {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("baud_rate must be one of: 115200, 230400, 460800, 500000, 921600")
            ));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10_000 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("timeout_ms must be between 1 and 10000")
            ));
        }

        if self.acquisition.cycle_period_ms < 10 || self.acquisition.cycle_period_ms > 10_000 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("cycle_period_ms must be between 10 and 10000")
            ));
        }

        if self.acquisition.filter_length == 0 || self.acquisition.filter_length > 1024 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("filter_length must be between 1 and 1024")
            ));
        }

        if self.acquisition.log_interval_cycles == 0 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("log_interval_cycles must be greater than 0")
            ));
        }

        if self.link.read_timeout_polls == 0 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("read_timeout_polls must be greater than 0")
            ));
        }

        if self.link.error_latch_count == 0 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("error_latch_count must be greater than 0")
            ));
        }

        if self.analog.vref_mv == 0 || self.analog.vref_mv > 5000 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("vref_mv must be between 1 and 5000")
            ));
        }

        if self.analog.rail_ref_mv == 0 || self.analog.rail_ref_mv > self.analog.vref_mv {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("rail_ref_mv must be between 1 and vref_mv")
            ));
        }

        // Keeps the widest rail-estimate intermediate inside u32.
        if self.analog.rail_divider == 0 || self.analog.rail_divider > 16 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("rail_divider must be between 1 and 16")
            ));
        }

        if self.analog.rail_nominal_mv < 1000 || self.analog.rail_nominal_mv > 24_000 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("rail_nominal_mv must be between 1000 and 24000")
            ));
        }

        if self.analog.sensitivity_mv_per_a == 0 || self.analog.sensitivity_mv_per_a > 1000 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("sensitivity_mv_per_a must be between 1 and 1000")
            ));
        }

        if self.analog.panel_divider == 0 || self.analog.panel_divider > 100 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("panel_divider must be between 1 and 100")
            ));
        }

        if self.analog.conversion_timeout_ms == 0 || self.analog.conversion_timeout_ms > 1000 {
            return Err(crate::error::TowertopError::Config(
                toml::de::Error::custom("conversion_timeout_ms must be between 1 and 1000")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 500_000);
        assert_eq!(config.acquisition.cycle_period_ms, 100);
        assert_eq!(config.acquisition.filter_length, 50);
        assert_eq!(config.link.read_timeout_polls, 40_000);
        assert_eq!(config.link.error_latch_count, 10);
        assert_eq!(config.analog.vref_mv, 4096);
        assert_eq!(config.analog.rail_ref_mv, 1024);
        assert_eq!(config.analog.rail_nominal_mv, 5000);
        assert_eq!(config.analog.sensitivity_mv_per_a, 100);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyUSB0"
baud_rate = 115200

[acquisition]
filter_length = 8

[link]

[analog]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.acquisition.filter_length, 8);
        // Untouched sections fall back to defaults
        assert_eq!(config.analog.vref_mv, 4096);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[acquisition]
filter_length = 0
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 9600;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &[115_200, 230_400, 460_800, 500_000, 921_600] {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_cycle_period_out_of_range() {
        let mut config = Config::default();
        config.acquisition.cycle_period_ms = 5;
        assert!(config.validate().is_err());

        config.acquisition.cycle_period_ms = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_length_zero() {
        let mut config = Config::default();
        config.acquisition.filter_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_length_too_long() {
        let mut config = Config::default();
        config.acquisition.filter_length = 1025;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_timeout_polls_zero() {
        let mut config = Config::default();
        config.link.read_timeout_polls = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_error_latch_count_zero() {
        let mut config = Config::default();
        config.link.error_latch_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rail_ref_above_vref() {
        let mut config = Config::default();
        config.analog.rail_ref_mv = config.analog.vref_mv + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rail_divider_out_of_range() {
        let mut config = Config::default();
        config.analog.rail_divider = 0;
        assert!(config.validate().is_err());

        config.analog.rail_divider = 17;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rail_nominal_out_of_range() {
        let mut config = Config::default();
        config.analog.rail_nominal_mv = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sensitivity_zero() {
        let mut config = Config::default();
        config.analog.sensitivity_mv_per_a = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_panel_divider_out_of_range() {
        let mut config = Config::default();
        config.analog.panel_divider = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversion_timeout_out_of_range() {
        let mut config = Config::default();
        config.analog.conversion_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.analog.conversion_timeout_ms = 1001;
        assert!(config.validate().is_err());
    }
}
