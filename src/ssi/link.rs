//! # Angle-Sensor Link
//!
//! Drives the synchronous byte-clock transport to pull one 24-bit frame per
//! axis out of the rotary encoders and decode it into an [`AngleReading`].
//!
//! The link has no hardware chip select, so each readout brackets the three
//! byte transfers with explicit select-line toggles. The two axes share the
//! single transport and are read strictly in sequence.

use tracing::debug;

use super::crc::verify_and_strip;
use super::protocol::{decode_payload, AngleReading, SSI_DUMMY_BYTE, SSI_FRAME_BYTES};
use crate::hal::{Axis, CommunicationStatus, SsiBus};

/// Reads angle frames from both encoders over a shared [`SsiBus`].
pub struct AngleSensorLink<B: SsiBus> {
    bus: B,
}

impl<B: SsiBus> AngleSensorLink<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Performs one readout of the given axis.
    ///
    /// Asserts the axis select line, clocks three dummy bytes while capturing
    /// the inbound bytes big-endian into a 24-bit word, releases the line and
    /// decodes the word.
    ///
    /// A timed-out byte transfer is not fatal: the transport records a
    /// warning and the stale bytes flow through, normally surfacing as a CRC
    /// mismatch flagged on the returned reading.
    pub fn read_angle(&mut self, axis: Axis) -> AngleReading {
        self.bus.select(axis, true);

        let mut word = 0u32;
        for _ in 0..SSI_FRAME_BYTES {
            self.bus.send_byte(SSI_DUMMY_BYTE);
            word = (word << 8) | u32::from(self.bus.read_byte());
        }

        self.bus.select(axis, false);

        let (payload, crc_valid) = verify_and_strip(word);
        if !crc_valid {
            debug!("CRC mismatch on {:?} frame 0x{:06X}", axis, word);
        }

        decode_payload(payload, crc_valid)
    }

    /// Snapshot of the transport's communication status.
    pub fn status(&self) -> CommunicationStatus {
        self.bus.status()
    }

    /// Clears the sticky warning flag (operator path).
    pub fn clear_warning(&mut self) {
        self.bus.clear_warning();
    }
}
