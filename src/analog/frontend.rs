//! # Analog Front-End
//!
//! Produces calibrated voltage and current readings from the shared
//! successive-approximation converter.
//!
//! The voltage channel is simple: the panel divider output range is known a
//! priori, so a single conversion against the fixed reference plus a linear
//! scale is enough.
//!
//! The current channel auto-ranges. The sensor is ratiometric: both its
//! zero-current offset (half rail) and its sensitivity scale with the supply
//! rail, and the rail is not precisely known. A single fixed reference would
//! either saturate at high current or waste resolution at low current across
//! the rail tolerance band, so each reading is two-phase:
//!
//! 1. convert the supply-sense divider against the low fixed reference and
//!    estimate the rail in millivolts;
//! 2. derive the sensor sensitivity for that rail;
//! 3. reconvert the current-sensor output against the rail-tied reference and
//!    scale it, subtracting the half-rail offset with a clamp at zero.
//!
//! All scaling is deterministic integer arithmetic on raw converter codes;
//! nothing is calibrated across cycles.

use crate::config::AnalogConfig;
use crate::error::{Result, TowertopError};
use crate::hal::{AdcChannel, AdcConverter, AdcReference};

/// Full-scale converter code (12-bit)
const ADC_FULL_SCALE: u32 = 4096;

/// Auto-ranging analog front-end over a shared converter.
///
/// `select` mutates converter configuration shared process-wide, so a
/// front-end reading must run to completion before any other conversion is
/// issued; the single-threaded acquisition cycle guarantees this.
pub struct AnalogFrontEnd<C: AdcConverter> {
    converter: C,
    vref_mv: u32,
    rail_ref_mv: u32,
    rail_divider: u32,
    rail_nominal_mv: u32,
    sensitivity_mv_per_a: u32,
    panel_divider: u32,
}

impl<C: AdcConverter> AnalogFrontEnd<C> {
    pub fn new(converter: C, analog: &AnalogConfig) -> Self {
        Self {
            converter,
            vref_mv: analog.vref_mv,
            rail_ref_mv: analog.rail_ref_mv,
            rail_divider: analog.rail_divider,
            rail_nominal_mv: analog.rail_nominal_mv,
            sensitivity_mv_per_a: analog.sensitivity_mv_per_a,
            panel_divider: analog.panel_divider,
        }
    }

    /// Reads the panel voltage in centivolts.
    ///
    /// One conversion against the fixed reference, scaled through the panel
    /// divider. The result is clamped to the 12-bit telemetry field.
    pub fn read_voltage(&mut self) -> Result<u16> {
        self.converter
            .select(AdcChannel::PanelVoltage, AdcReference::Fixed4V096);
        let raw = u32::from(self.converter.convert()?);

        let pin_mv = raw * self.vref_mv / ADC_FULL_SCALE;
        let panel_cv = pin_mv * self.panel_divider / 10;
        Ok(panel_cv.min(0xFFF) as u16)
    }

    /// Estimates the supply rail in millivolts from the supply-sense divider.
    pub fn estimate_rail_mv(&mut self) -> Result<u32> {
        self.converter
            .select(AdcChannel::SupplySense, AdcReference::Fixed1V024);
        let raw = u32::from(self.converter.convert()?);

        Ok(raw * self.rail_ref_mv / ADC_FULL_SCALE * self.rail_divider)
    }

    /// Reads the panel current in centiamps via two-phase ranging.
    ///
    /// The scale coefficient is derived from the rail estimate
    /// (`sensitivity_mv_per_a * rail / rail_nominal`, in uV per mA); the
    /// conversion itself runs against the rail-tied reference. The half-rail
    /// zero-current offset is subtracted only when the scaled reading
    /// exceeds it; readings below the offset clamp to zero, never wrap.
    ///
    /// # Errors
    ///
    /// Returns an error when a conversion fails or when the rail estimate is
    /// too low to derive a usable coefficient.
    pub fn read_current(&mut self) -> Result<u16> {
        let rail_mv = self.estimate_rail_mv()?;

        let sens_uv_per_ma = self.sensitivity_mv_per_a * rail_mv / self.rail_nominal_mv;
        if sens_uv_per_ma == 0 {
            return Err(TowertopError::Converter(format!(
                "rail estimate {} mV too low to derive a current scale",
                rail_mv
            )));
        }

        self.converter
            .select(AdcChannel::PanelCurrent, AdcReference::SupplyRail);
        let raw = u64::from(self.converter.convert()?);

        let pin_mv = raw * u64::from(rail_mv) / u64::from(ADC_FULL_SCALE);
        let offset_mv = u64::from(rail_mv) / 2;

        let current_ma = if pin_mv > offset_mv {
            (pin_mv - offset_mv) * 1000 / u64::from(sens_uv_per_ma)
        } else {
            0
        };

        Ok(((current_ma / 10).min(0xFFF)) as u16)
    }
}
