//! # Telemetry Framer
//!
//! Packs one cycle's measurements into a 60-bit word, checksums it and
//! renders the fixed-width telemetry line.
//!
//! Frame syntax (lowercase hex, leading zeros kept):
//!
//! ```text
//! <EEEEAAAAVVVCCCSNN>\r\n
//!  EEEE  elevation angle, centidegrees
//!  AAAA  azimuth angle, centidegrees
//!  VVV   filtered panel voltage, centivolts
//!  CCC   filtered panel current, centiamps
//!  S     limit-switch status
//!  NN    CRC-8/CDMA2000 of the packed word
//! ```
//!
//! Field widths are not self-describing; this is a closed point-to-point
//! contract and the receiver knows them a priori.
//!
//! Packed word layout, used only to feed the checksum:
//!
//! ```text
//! bits [59:44] elevation  [43:28] azimuth  [27:16] voltage
//! bits [15:4]  current    [3:0]   switch status
//! ```

use super::crc::crc8_of_word;
use crate::error::{Result, TowertopError};

/// Rendered frame length in bytes, delimiters and terminator included
pub const FRAME_LEN: usize = 21;

/// Frame start delimiter
pub const FRAME_START: char = '<';

/// Frame end delimiter
pub const FRAME_END: char = '>';

/// One cycle's telemetry, built, rendered and discarded per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Elevation angle in centidegrees (0-35999)
    pub elevation_cdeg: u16,
    /// Azimuth angle in centidegrees (0-35999)
    pub azimuth_cdeg: u16,
    /// Filtered panel voltage in centivolts (12-bit field)
    pub voltage: u16,
    /// Filtered panel current in centiamps (12-bit field)
    pub current: u16,
    /// 2-bit limit-switch status
    pub switches: u8,
}

impl TelemetryFrame {
    /// Create a frame, validating every field against its bit width
    ///
    /// # Errors
    ///
    /// Returns error if an angle reaches a full turn, an analog value
    /// exceeds its 12-bit field or the switch status exceeds 2 bits
    pub fn new(
        elevation_cdeg: u16,
        azimuth_cdeg: u16,
        voltage: u16,
        current: u16,
        switches: u8,
    ) -> Result<Self> {
        if elevation_cdeg >= 36000 || azimuth_cdeg >= 36000 {
            return Err(TowertopError::Protocol(format!(
                "angle out of range: elevation {} / azimuth {} cdeg",
                elevation_cdeg, azimuth_cdeg
            )));
        }
        if voltage > 0xFFF || current > 0xFFF {
            return Err(TowertopError::Protocol(format!(
                "analog value exceeds 12-bit field: voltage {} / current {}",
                voltage, current
            )));
        }
        if switches > 0x3 {
            return Err(TowertopError::Protocol(format!(
                "switch status 0x{:X} exceeds 2 bits",
                switches
            )));
        }

        Ok(Self {
            elevation_cdeg,
            azimuth_cdeg,
            voltage,
            current,
            switches,
        })
    }

    /// The 60-bit packed word fed into the checksum
    pub fn packed_word(&self) -> u64 {
        (u64::from(self.elevation_cdeg) << 44)
            | (u64::from(self.azimuth_cdeg) << 28)
            | (u64::from(self.voltage) << 16)
            | (u64::from(self.current) << 4)
            | u64::from(self.switches)
    }

    /// The frame's CRC-8 over the packed word's minimal significant bytes
    pub fn crc(&self) -> u8 {
        crc8_of_word(self.packed_word())
    }

    /// Renders the complete telemetry line, terminator included
    pub fn render(&self) -> String {
        format!(
            "{}{:04x}{:04x}{:03x}{:03x}{:x}{:02x}{}\r\n",
            FRAME_START,
            self.elevation_cdeg,
            self.azimuth_cdeg,
            self.voltage,
            self.current,
            self.switches,
            self.crc(),
            FRAME_END,
        )
    }
}

/// Parse and verify a rendered telemetry line (receiver side)
///
/// Accepts the line with or without its `\r\n` terminator.
///
/// # Errors
///
/// Returns error if the delimiters or length are wrong, a field is not
/// valid hex, a field is out of range or the checksum does not match
pub fn parse_frame(line: &str) -> Result<TelemetryFrame> {
    let body = line.trim_end_matches(['\r', '\n']);

    if body.len() != FRAME_LEN - 2
        || !body.is_ascii()
        || !body.starts_with(FRAME_START)
        || !body.ends_with(FRAME_END)
    {
        return Err(TowertopError::Protocol(format!(
            "malformed frame: {:?}",
            line
        )));
    }

    let hex = &body[1..body.len() - 1];
    let field = |range: std::ops::Range<usize>| -> Result<u16> {
        u16::from_str_radix(&hex[range.clone()], 16).map_err(|_| {
            TowertopError::Protocol(format!("invalid hex in field {:?}: {:?}", range, line))
        })
    };

    let frame = TelemetryFrame::new(
        field(0..4)?,
        field(4..8)?,
        field(8..11)?,
        field(11..14)?,
        field(14..15)? as u8,
    )?;

    let received_crc = field(15..17)? as u8;
    let expected_crc = frame.crc();
    if received_crc != expected_crc {
        return Err(TowertopError::Protocol(format!(
            "CRC mismatch: expected 0x{:02x}, got 0x{:02x}",
            expected_crc, received_crc
        )));
    }

    Ok(frame)
}
