//! # CRC-6 Implementation
//!
//! CRC-6 checksum calculation for the angle-sensor frame.
//!
//! **Polynomial**: 0x03 (x^6 + x + 1)
//! **Initial Value**: 0x00
//!
//! The sensor appends a 6-bit CRC to its 18-bit payload; the checksum is
//! processed 6 bits at a time across the three 6-bit nibbles of the payload,
//! most-significant nibble first.

/// CRC-6 polynomial (x^6 + x + 1)
const CRC6_POLY: u8 = 0x03;

/// Mask for the 18-bit sensor payload
pub const PAYLOAD_MASK: u32 = 0x3_FFFF;

/// Precomputed CRC6 lookup table for fast calculation
const CRC6_TABLE: [u8; 64] = generate_crc6_table();

/// Generate CRC6 lookup table at compile time
const fn generate_crc6_table() -> [u8; 64] {
    let mut table = [0u8; 64];
    let mut i = 0;

    while i < 64 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 6 {
            if (crc & 0x20) != 0 {
                crc = ((crc << 1) ^ CRC6_POLY) & 0x3F;
            } else {
                crc = (crc << 1) & 0x3F;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the CRC-6 checksum of an 18-bit payload using the lookup table
///
/// # Arguments
///
/// * `payload` - 18-bit data word (angle + status bits, CRC excluded)
///
/// # Returns
///
/// * `u8` - Calculated 6-bit checksum
pub fn crc6(payload: u32) -> u8 {
    let payload = payload & PAYLOAD_MASK;
    let mut crc = 0u8;

    for shift in [12, 6, 0] {
        crc = CRC6_TABLE[usize::from(crc ^ ((payload >> shift) as u8 & 0x3F))];
    }

    crc
}

/// Split a received 24-bit frame into payload and CRC validity.
///
/// The low 6 bits carry the transmitted CRC; the remaining high 18 bits are
/// the payload. The payload is returned even when the check fails, so a
/// mismatch is flagged, never swallowed, and the caller decides whether to
/// discard the value.
///
/// # Arguments
///
/// * `frame` - Complete 24-bit frame as shifted in from the sensor
///
/// # Returns
///
/// * `(u32, bool)` - 18-bit payload and whether the CRC matched
pub fn verify_and_strip(frame: u32) -> (u32, bool) {
    let received_crc = (frame & 0x3F) as u8;
    let payload = (frame >> 6) & PAYLOAD_MASK;
    (payload, crc6(payload) == received_crc)
}

/// Calculate CRC-6 using the direct bit-by-bit algorithm (slow, for verification)
#[allow(dead_code)]
fn crc6_slow(payload: u32) -> u8 {
    let mut crc = 0u8;

    for shift in [12, 6, 0] {
        crc ^= ((payload & PAYLOAD_MASK) >> shift) as u8 & 0x3F;

        for _ in 0..6 {
            if (crc & 0x20) != 0 {
                crc = ((crc << 1) ^ CRC6_POLY) & 0x3F;
            } else {
                crc = (crc << 1) & 0x3F;
            }
        }
    }

    crc
}
