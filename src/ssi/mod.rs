//! # Synchronous Serial Interface (SSI) Module
//!
//! Bit-level protocol for the absolute rotary encoders: CRC-6 frame
//! validation, payload decoding and the link driver that shifts frames in
//! over the shared byte-clock transport.

pub mod crc;
pub mod link;
pub mod protocol;

pub use link::AngleSensorLink;
pub use protocol::{AngleReading, MagneticFieldStatus};
