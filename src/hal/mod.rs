//! # Hardware Access Traits
//!
//! Trait abstractions over the peripherals the acquisition pipeline consumes:
//! the synchronous encoder link, the analog converter and the limit-switch
//! inputs. Pin, clock and peripheral bring-up live behind these traits; the
//! pipeline only issues the operations specified here.
//!
//! The whole node is single-threaded and strictly sequential, so implementors
//! may assume no two operations ever interleave.

pub mod sim;

use crate::error::Result;

/// Mechanical axis served by the angle-sensor link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Elevation,
    Azimuth,
}

/// Multiplexed analog input channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    /// Solar-panel voltage through a resistive divider
    PanelVoltage,
    /// Current-sensor output
    PanelCurrent,
    /// Supply rail through a resistive divider, used for ranging
    SupplySense,
}

/// Selectable converter reference voltages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcReference {
    /// Fixed 4.096 V reference (voltage channel)
    Fixed4V096,
    /// Fixed 1.024 V reference (supply-rail estimate)
    Fixed1V024,
    /// Reference tied to the supply rail (current channel)
    SupplyRail,
}

/// Process-wide communication status for the sensor link.
///
/// The warning flag is sticky: a byte-read timeout sets it and nothing in the
/// acquisition path clears it. `clear_warning` exists for the external
/// operator path. The error flag latches once `error_count` reaches the
/// configured limit and is reset only at power-on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommunicationStatus {
    /// Set on a sensor-link read timeout; sticky until explicitly cleared
    pub warning: bool,
    /// Latched once the bounded error counter saturates
    pub error: bool,
    /// Bounded count of recorded timeouts
    pub error_count: u8,
}

impl CommunicationStatus {
    /// Records one byte-read timeout.
    ///
    /// Sets the warning flag, advances the bounded counter and latches the
    /// error flag once `latch_count` timeouts have been recorded.
    pub fn record_timeout(&mut self, latch_count: u8) {
        self.warning = true;
        if self.error_count < latch_count {
            self.error_count += 1;
        }
        if self.error_count >= latch_count {
            self.error = true;
        }
    }

    /// Clears the sticky warning flag (operator path).
    pub fn clear_warning(&mut self) {
        self.warning = false;
    }
}

/// Synchronous byte-clock transport to the angle sensors.
///
/// The link has no hardware chip select; the two per-axis select lines are
/// plain outputs toggled through [`SsiBus::select`]. Byte transfers block
/// until the peer responds or a bounded internal timeout elapses; on timeout
/// the implementation records it on its [`CommunicationStatus`] and
/// `read_byte` yields whatever value is currently latched.
pub trait SsiBus {
    /// Drives one axis's select line (`asserted` = line pulled low).
    fn select(&mut self, axis: Axis, asserted: bool);

    /// Clocks one dummy byte out; only the clock edges matter.
    fn send_byte(&mut self, value: u8);

    /// Shifts one byte in, blocking up to the bounded timeout.
    fn read_byte(&mut self) -> u8;

    /// Snapshot of the link's communication status.
    fn status(&self) -> CommunicationStatus;

    /// Clears the sticky warning flag (operator path).
    fn clear_warning(&mut self);
}

/// Successive-approximation converter with a multiplexed input and a
/// selectable reference.
///
/// `select` mutates converter configuration shared across all channels, so
/// the select/convert pair of one measurement must never interleave with
/// another. `convert` waits for conversion-complete bounded by the configured
/// timeout and reports expiry as an error rather than hanging the cycle.
#[cfg_attr(test, mockall::automock)]
pub trait AdcConverter {
    /// Routes `channel` to the converter and applies `reference`.
    fn select(&mut self, channel: AdcChannel, reference: AdcReference);

    /// Starts one conversion and waits for the 12-bit sample.
    fn convert(&mut self) -> Result<u16>;
}

/// Two active-low limit-switch inputs on the elevation travel.
pub trait LimitSwitches {
    /// Raw level of the lower-limit input (high = released).
    fn y_min(&mut self) -> bool;

    /// Raw level of the upper-limit input (high = released).
    fn y_max(&mut self) -> bool;
}

/// Composes the 2-bit switch status from the active-low inputs.
///
/// Bit 0 is set when the lower limit is engaged, bit 1 when the upper limit
/// is engaged, giving the values 0 through 3.
pub fn switch_status<S: LimitSwitches>(switches: &mut S) -> u8 {
    u8::from(!switches.y_min()) | (u8::from(!switches.y_max()) << 1)
}
