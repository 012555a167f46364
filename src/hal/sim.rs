//! # Simulated Bench Rig
//!
//! Deterministic in-memory implementations of the hardware traits so the
//! acquisition pipeline can run end-to-end on a bench host and in tests.
//!
//! The simulated encoders advance a fixed number of raw counts per readout,
//! the converter answers with codes derived from a fixed rail, panel voltage
//! and load current, and the limit switches stay released. All values are
//! reproducible from cycle to cycle.

use super::{AdcChannel, AdcReference, Axis, CommunicationStatus, LimitSwitches, SsiBus};
use crate::error::{Result, TowertopError};
use crate::ssi::crc::crc6;

/// Raw counts each encoder advances per readout
const RAW_STEP: u16 = 13;

/// Simulated angle-sensor link.
///
/// Builds a valid 24-bit frame (payload + CRC-6) when an axis is selected and
/// serves it back one byte per `read_byte`. With `drop_replies` set the rig
/// stops answering, which exercises the timeout degradation path: reads yield
/// a stale 0xFF and the communication status records a timeout.
pub struct SimBus {
    raw_angle: [u16; 2],
    pending: Vec<u8>,
    status: CommunicationStatus,
    error_latch_count: u8,
    drop_replies: bool,
}

impl SimBus {
    pub fn new(error_latch_count: u8) -> Self {
        Self {
            raw_angle: [4096, 0],
            pending: Vec::new(),
            status: CommunicationStatus::default(),
            error_latch_count,
            drop_replies: false,
        }
    }

    /// Stops serving frame bytes, forcing timeouts on subsequent reads.
    pub fn set_drop_replies(&mut self, drop: bool) {
        self.drop_replies = drop;
    }

    /// Current raw angle code of one axis (test inspection).
    pub fn raw_angle(&self, axis: Axis) -> u16 {
        self.raw_angle[axis_index(axis)]
    }

    fn load_frame(&mut self, axis: Axis) {
        let raw = self.raw_angle[axis_index(axis)];
        // Status nibble all zero: field normal, no push, on track
        let payload = u32::from(raw) << 4;
        let frame = (payload << 6) | u32::from(crc6(payload));
        self.pending = frame.to_be_bytes()[1..].to_vec();

        // Advance for the next readout, wrapping at one revolution
        self.raw_angle[axis_index(axis)] = (raw + RAW_STEP) & 0x3FFF;
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::Elevation => 0,
        Axis::Azimuth => 1,
    }
}

impl SsiBus for SimBus {
    fn select(&mut self, axis: Axis, asserted: bool) {
        if asserted && !self.drop_replies {
            self.load_frame(axis);
        }
    }

    fn send_byte(&mut self, _value: u8) {}

    fn read_byte(&mut self) -> u8 {
        if self.pending.is_empty() {
            self.status.record_timeout(self.error_latch_count);
            return 0xFF;
        }
        self.pending.remove(0)
    }

    fn status(&self) -> CommunicationStatus {
        self.status
    }

    fn clear_warning(&mut self) {
        self.status.clear_warning();
    }
}

/// Simulated analog converter.
///
/// Answers with the 12-bit code a real converter would produce for the
/// configured rail, panel voltage and load current given the selected
/// channel/reference pair. Converting without a prior `select` is a sequencing
/// bug and is reported as an error.
pub struct SimConverter {
    rail_mv: u32,
    panel_mv: u32,
    current_ma: u32,
    rail_ref_mv: u32,
    rail_divider: u32,
    vref_mv: u32,
    panel_divider: u32,
    sensitivity_mv_per_a: u32,
    rail_nominal_mv: u32,
    selected: Option<(AdcChannel, AdcReference)>,
}

impl SimConverter {
    pub fn new(analog: &crate::config::AnalogConfig) -> Self {
        Self {
            rail_mv: analog.rail_nominal_mv,
            panel_mv: 18_000,
            current_ma: 1500,
            rail_ref_mv: analog.rail_ref_mv,
            rail_divider: analog.rail_divider,
            vref_mv: analog.vref_mv,
            panel_divider: analog.panel_divider,
            sensitivity_mv_per_a: analog.sensitivity_mv_per_a,
            rail_nominal_mv: analog.rail_nominal_mv,
            selected: None,
        }
    }

    /// Overrides the simulated operating point (test inspection).
    pub fn set_operating_point(&mut self, rail_mv: u32, panel_mv: u32, current_ma: u32) {
        self.rail_mv = rail_mv;
        self.panel_mv = panel_mv;
        self.current_ma = current_ma;
    }

    fn code_for(&self, channel: AdcChannel, reference: AdcReference) -> u16 {
        let (pin_mv, ref_mv) = match (channel, reference) {
            (AdcChannel::SupplySense, _) => (self.rail_mv / self.rail_divider, self.rail_ref_mv),
            (AdcChannel::PanelVoltage, _) => (self.panel_mv / self.panel_divider, self.vref_mv),
            (AdcChannel::PanelCurrent, _) => {
                // Ratiometric sensor: offset at half rail, sensitivity
                // proportional to the actual rail
                let sens = self.sensitivity_mv_per_a * self.rail_mv / self.rail_nominal_mv;
                let pin = self.rail_mv / 2 + self.current_ma * sens / 1000;
                let reference_mv = match reference {
                    AdcReference::SupplyRail => self.rail_mv,
                    AdcReference::Fixed4V096 => self.vref_mv,
                    AdcReference::Fixed1V024 => self.rail_ref_mv,
                };
                (pin, reference_mv)
            }
        };
        ((pin_mv * 4096 / ref_mv).min(4095)) as u16
    }
}

impl super::AdcConverter for SimConverter {
    fn select(&mut self, channel: AdcChannel, reference: AdcReference) {
        self.selected = Some((channel, reference));
    }

    fn convert(&mut self) -> Result<u16> {
        let (channel, reference) = self.selected.ok_or_else(|| {
            TowertopError::Converter("conversion started with no channel selected".to_string())
        })?;
        Ok(self.code_for(channel, reference))
    }
}

/// Simulated limit switches, both released.
pub struct SimSwitches;

impl LimitSwitches for SimSwitches {
    fn y_min(&mut self) -> bool {
        true
    }

    fn y_max(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalogConfig;
    use crate::hal::AdcConverter;
    use crate::ssi::crc::verify_and_strip;

    #[test]
    fn test_sim_bus_serves_valid_frames() {
        let mut bus = SimBus::new(10);

        bus.select(Axis::Elevation, true);
        let mut word = 0u32;
        for _ in 0..3 {
            bus.send_byte(b'o');
            word = (word << 8) | u32::from(bus.read_byte());
        }
        bus.select(Axis::Elevation, false);

        let (payload, ok) = verify_and_strip(word);
        assert!(ok);
        assert_eq!(payload >> 4, 4096);
        assert!(!bus.status().warning);
    }

    #[test]
    fn test_sim_bus_angle_advances_and_wraps() {
        let mut bus = SimBus::new(10);
        let start = bus.raw_angle(Axis::Azimuth);
        bus.select(Axis::Azimuth, true);
        assert_eq!(bus.raw_angle(Axis::Azimuth), (start + RAW_STEP) & 0x3FFF);
    }

    #[test]
    fn test_sim_bus_dropped_replies_record_timeouts() {
        let mut bus = SimBus::new(10);
        bus.set_drop_replies(true);

        bus.select(Axis::Elevation, true);
        assert_eq!(bus.read_byte(), 0xFF);
        assert!(bus.status().warning);
        assert_eq!(bus.status().error_count, 1);
    }

    #[test]
    fn test_sim_converter_requires_select() {
        let mut adc = SimConverter::new(&AnalogConfig::default());
        assert!(adc.convert().is_err());
    }

    #[test]
    fn test_sim_converter_rail_code() {
        let mut adc = SimConverter::new(&AnalogConfig::default());
        adc.select(AdcChannel::SupplySense, AdcReference::Fixed1V024);

        // 5000 mV rail / 6 divider = 833 mV at the pin, 1.024 V reference:
        // 833 * 4096 / 1024
        let code = adc.convert().unwrap();
        assert_eq!(code, 3332);
    }

    #[test]
    fn test_sim_converter_current_code_is_above_offset() {
        let mut adc = SimConverter::new(&AnalogConfig::default());
        adc.select(AdcChannel::PanelCurrent, AdcReference::SupplyRail);

        // Positive load current sits above the half-rail offset (code 2048)
        let code = adc.convert().unwrap();
        assert!(code > 2048);
    }
}
