//! # Telemetry Module
//!
//! Frame packing, CRC-8 integrity protection and fixed-width rendering of
//! the once-per-cycle telemetry line.

pub mod crc;
pub mod frame;

pub use frame::{parse_frame, TelemetryFrame};
