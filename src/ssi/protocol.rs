//! # Angle-Sensor Protocol Definitions
//!
//! Frame layout and decoding for the rotary encoder's synchronous serial
//! frame.
//!
//! One readout shifts in 24 bits: an 18-bit payload followed by a 6-bit CRC.
//! Payload layout, most-significant bit first:
//!
//! ```text
//! [17:4] raw angle code (14 bits, 0-16383, one revolution)
//! [3:2]  magnetic-field status (0 normal, 1 too strong, 2 too weak)
//! [1]    push-button detected
//! [0]    loss of track
//! ```

/// Bytes per sensor frame (24 bits)
pub const SSI_FRAME_BYTES: usize = 3;

/// Dummy byte clocked out to generate the read clock; the value carries no
/// payload
pub const SSI_DUMMY_BYTE: u8 = b'o';

/// Raw angle code range (14 bits, one mechanical revolution)
pub const RAW_ANGLE_CODES: u32 = 16_384;

/// One revolution in centidegrees
pub const FULL_TURN_CDEG: u32 = 36_000;

/// Magnetic-field strength reported by the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagneticFieldStatus {
    Normal,
    TooStrong,
    TooWeak,
    /// Value 3 is unused by the sensor
    Reserved,
}

impl MagneticFieldStatus {
    /// Decodes the 2-bit field-status code
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Normal,
            1 => Self::TooStrong,
            2 => Self::TooWeak,
            _ => Self::Reserved,
        }
    }
}

/// One decoded angle readout.
///
/// Created fresh each acquisition cycle and overwritten in place; no history
/// is retained beyond the current value. A reading with `crc_valid` false is
/// still fully populated; policy on discarding it belongs to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleReading {
    /// Angle in centidegrees (0-35999)
    pub angle_cdeg: u16,
    /// Raw 14-bit angle code the angle was scaled from
    pub raw_code: u16,
    pub field_status: MagneticFieldStatus,
    pub push_button: bool,
    /// True when the sensor reports loss of track
    pub loss_of_track: bool,
    /// False when the frame CRC did not match
    pub crc_valid: bool,
}

/// Scale a raw 14-bit angle code to centidegrees, rounded to nearest.
///
/// `raw * 36000 / 16384` with half-up rounding; the full code space maps to
/// one revolution, so 0 maps to 0.00 deg and 16383 to 359.98 deg.
pub fn raw_to_centidegrees(raw: u16) -> u16 {
    let raw = u32::from(raw) % RAW_ANGLE_CODES;
    ((raw * FULL_TURN_CDEG + RAW_ANGLE_CODES / 2) / RAW_ANGLE_CODES) as u16
}

/// Decode an 18-bit verified-and-stripped payload into an [`AngleReading`]
///
/// # Arguments
///
/// * `payload` - 18-bit payload from [`crate::ssi::crc::verify_and_strip`]
/// * `crc_valid` - Whether the frame CRC matched
pub fn decode_payload(payload: u32, crc_valid: bool) -> AngleReading {
    let raw_code = ((payload >> 4) & 0x3FFF) as u16;
    let status = (payload & 0xF) as u8;

    AngleReading {
        angle_cdeg: raw_to_centidegrees(raw_code),
        raw_code,
        field_status: MagneticFieldStatus::from_bits(status >> 2),
        push_button: status & 0x2 != 0,
        loss_of_track: status & 0x1 != 0,
        crc_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_reference_points() {
        assert_eq!(raw_to_centidegrees(0), 0);
        assert_eq!(raw_to_centidegrees(4096), 9000);
        assert_eq!(raw_to_centidegrees(8192), 18000);
        assert_eq!(raw_to_centidegrees(16383), 35998);
    }

    #[test]
    fn test_scale_is_monotonic() {
        let mut previous = 0;
        for raw in 0..16384u16 {
            let cdeg = raw_to_centidegrees(raw);
            assert!(cdeg >= previous, "scale must not decrease at raw {}", raw);
            previous = cdeg;
        }
        assert!(previous < 36000);
    }

    #[test]
    fn test_scale_wraps_at_full_revolution() {
        // Code 16384 is one full turn, identical to code 0
        assert_eq!(raw_to_centidegrees(16384u16 % 16384), 0);
    }

    #[test]
    fn test_decode_angle_bits() {
        let payload = 4096u32 << 4;
        let reading = decode_payload(payload, true);

        assert_eq!(reading.raw_code, 4096);
        assert_eq!(reading.angle_cdeg, 9000);
        assert_eq!(reading.field_status, MagneticFieldStatus::Normal);
        assert!(!reading.push_button);
        assert!(!reading.loss_of_track);
        assert!(reading.crc_valid);
    }

    #[test]
    fn test_decode_status_bits() {
        // Field too weak (2), push button set, loss of track set
        let payload = (100u32 << 4) | (0b10 << 2) | 0b10 | 0b01;
        let reading = decode_payload(payload, true);

        assert_eq!(reading.field_status, MagneticFieldStatus::TooWeak);
        assert!(reading.push_button);
        assert!(reading.loss_of_track);
    }

    #[test]
    fn test_decode_preserves_crc_flag() {
        let reading = decode_payload(0, false);
        assert!(!reading.crc_valid);
        assert_eq!(reading.angle_cdeg, 0, "value still surfaced on bad CRC");
    }

    #[test]
    fn test_field_status_codes() {
        assert_eq!(MagneticFieldStatus::from_bits(0), MagneticFieldStatus::Normal);
        assert_eq!(MagneticFieldStatus::from_bits(1), MagneticFieldStatus::TooStrong);
        assert_eq!(MagneticFieldStatus::from_bits(2), MagneticFieldStatus::TooWeak);
        assert_eq!(MagneticFieldStatus::from_bits(3), MagneticFieldStatus::Reserved);
    }
}
