//! # Towertop Node Library
//!
//! Sensor acquisition and telemetry-integrity pipeline for a tower-top
//! solar-tracker node.
//!
//! This library reads two absolute rotary encoders over a synchronous serial
//! link, measures the solar panel's voltage and current through an
//! auto-ranging analog front-end, smooths the analog readings, and emits one
//! framed, CRC-8-protected telemetry line per acquisition cycle.

pub mod acquisition;
pub mod analog;
pub mod config;
pub mod error;
pub mod hal;
pub mod serial;
pub mod ssi;
pub mod telemetry;
