//! # CRC-8/CDMA2000 Implementation
//!
//! CRC-8 checksum protecting the outgoing telemetry frame.
//!
//! **Polynomial**: 0x9B (x^8 + x^7 + x^4 + x^3 + x + 1)
//! **Initial Value**: 0xFF
//!
//! The frame checksum runs over the packed word's *minimal significant
//! bytes*: leading all-zero bytes above the highest set byte are excluded,
//! and a zero word contributes no bytes at all (yielding the 0xFF initial
//! value). Deployed receivers compute the checksum the same way, so this
//! byte-count dependence is part of the wire contract and must not be
//! "fixed" to a constant width.

/// CRC-8/CDMA2000 polynomial
const CRC8_POLY: u8 = 0x9B;

/// CRC-8/CDMA2000 initial value
const CRC8_INIT: u8 = 0xFF;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the CRC-8/CDMA2000 checksum of a byte slice
///
/// # Arguments
///
/// * `data` - Bytes to checksum
///
/// # Returns
///
/// * `u8` - Calculated checksum (0xFF for an empty slice)
pub fn crc8_cdma2000(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;

    for &byte in data {
        crc = CRC8_TABLE[usize::from(crc ^ byte)];
    }

    crc
}

/// The minimal big-endian byte representation of a packed word.
///
/// An all-zero word maps to no bytes; otherwise exactly
/// ceil(bit_length / 8) bytes, most significant first.
pub fn significant_bytes(word: u64) -> Vec<u8> {
    if word == 0 {
        return Vec::new();
    }
    let count = (64 - word.leading_zeros() as usize).div_ceil(8);
    word.to_be_bytes()[8 - count..].to_vec()
}

/// Calculate the telemetry checksum of a packed word over its minimal
/// significant bytes.
pub fn crc8_of_word(word: u64) -> u8 {
    crc8_cdma2000(&significant_bytes(word))
}

/// Calculate CRC-8/CDMA2000 using the direct algorithm (slow, for verification)
#[allow(dead_code)]
fn crc8_cdma2000_slow(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_check_value() {
        // Standard CRC-8/CDMA2000 check value
        assert_eq!(crc8_cdma2000(b"123456789"), 0xDA);
    }

    #[test]
    fn test_crc8_empty_is_init() {
        assert_eq!(crc8_cdma2000(&[]), 0xFF);
    }

    #[test]
    fn test_crc8_single_bytes() {
        assert_eq!(crc8_cdma2000(&[0x00]), 0x7B);
        assert_eq!(crc8_cdma2000(&[0xFF]), 0x00);
    }

    #[test]
    fn test_crc8_lookup_table_matches_slow() {
        let test_data: [&[u8]; 5] = [
            &[0x01, 0x02, 0x03],
            &[0xFF, 0xFE, 0xFD],
            &[0x02, 0x32, 0x80, 0x00, 0x00, 0x06, 0x40, 0x32],
            &[0x00; 8],
            b"123456789",
        ];

        for data in test_data {
            assert_eq!(
                crc8_cdma2000(data),
                crc8_cdma2000_slow(data),
                "CRC mismatch for data: {:?}",
                data
            );
        }
    }

    #[test]
    fn test_significant_bytes() {
        assert_eq!(significant_bytes(0), Vec::<u8>::new());
        assert_eq!(significant_bytes(0x7B), vec![0x7B]);
        assert_eq!(significant_bytes(0x100), vec![0x01, 0x00]);
        assert_eq!(
            significant_bytes(0x0232_8000_0064_0322),
            vec![0x02, 0x32, 0x80, 0x00, 0x00, 0x64, 0x03, 0x22]
        );
    }

    #[test]
    fn test_word_crc_depends_on_byte_count() {
        // The same numeric tail checksums differently once a leading zero
        // byte is included; the word form always takes the short path.
        assert_eq!(crc8_of_word(0xFF), 0x00);
        assert_eq!(crc8_cdma2000(&[0x00, 0xFF]), 0xCA);
        assert_ne!(crc8_of_word(0xFF), crc8_cdma2000(&[0x00, 0xFF]));

        assert_eq!(crc8_of_word(0x00), 0xFF);
        assert_eq!(crc8_cdma2000(&[0x00]), 0x7B);
        assert_ne!(crc8_of_word(0x00), crc8_cdma2000(&[0x00]));
    }

    #[test]
    fn test_word_crc_crossing_a_byte_boundary() {
        // Adjacent words either side of a byte boundary use different byte
        // counts (1 vs 2)
        assert_eq!(significant_bytes(0xFF).len(), 1);
        assert_eq!(significant_bytes(0x100).len(), 2);
        assert_eq!(crc8_of_word(0x100), 0xA7);
    }

    #[test]
    fn test_crc8_changes_with_data() {
        assert_ne!(
            crc8_cdma2000(&[0x18, 0x16, 0x00, 0x04]),
            crc8_cdma2000(&[0x18, 0x16, 0x00, 0x05])
        );
    }
}
