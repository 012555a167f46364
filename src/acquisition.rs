//! # Acquisition Pipeline
//!
//! One acquisition cycle reads both encoders, both analog channels and the
//! limit switches, smooths the analog values and packs everything into a
//! telemetry frame. The whole cycle is strictly sequential: the shared
//! transports are owned by this pipeline and never accessed from anywhere
//! else while a cycle is in progress.

use tracing::warn;

use crate::analog::{AnalogFrontEnd, MovingAverage};
use crate::config::Config;
use crate::error::Result;
use crate::hal::{switch_status, AdcConverter, Axis, CommunicationStatus, LimitSwitches, SsiBus};
use crate::ssi::{AngleReading, AngleSensorLink};
use crate::telemetry::TelemetryFrame;

/// Everything one acquisition cycle produced.
///
/// Built fresh each cycle and discarded after the frame is rendered; no
/// history is retained here beyond what the smoothing filters hold.
#[derive(Debug, Clone, Copy)]
pub struct CycleReadings {
    pub elevation: AngleReading,
    pub azimuth: AngleReading,
    /// Filtered panel voltage, centivolts
    pub voltage: u16,
    /// Filtered panel current, centiamps
    pub current: u16,
    /// 2-bit limit-switch status
    pub switches: u8,
    /// Sensor-link status snapshot after the encoder readouts
    pub link: CommunicationStatus,
}

impl CycleReadings {
    /// Packs the cycle's measurements into a telemetry frame
    pub fn frame(&self) -> Result<TelemetryFrame> {
        TelemetryFrame::new(
            self.elevation.angle_cdeg,
            self.azimuth.angle_cdeg,
            self.voltage,
            self.current,
            self.switches,
        )
    }
}

/// The tower-top sensor node pipeline.
pub struct SensorNode<B: SsiBus, C: AdcConverter, S: LimitSwitches> {
    link: AngleSensorLink<B>,
    frontend: AnalogFrontEnd<C>,
    switches: S,
    voltage_filter: MovingAverage,
    current_filter: MovingAverage,
}

impl<B: SsiBus, C: AdcConverter, S: LimitSwitches> SensorNode<B, C, S> {
    pub fn new(bus: B, converter: C, switches: S, config: &Config) -> Self {
        Self {
            link: AngleSensorLink::new(bus),
            frontend: AnalogFrontEnd::new(converter, &config.analog),
            switches,
            voltage_filter: MovingAverage::new(config.acquisition.filter_length),
            current_filter: MovingAverage::new(config.acquisition.filter_length),
        }
    }

    /// Runs one full acquisition cycle.
    ///
    /// Degraded encoder readings (timeout, CRC mismatch) flow through with
    /// their flags set; only a converter failure aborts the cycle, since
    /// without a sample there is nothing sensible to smooth or report.
    pub fn run_cycle(&mut self) -> Result<CycleReadings> {
        let elevation = self.link.read_angle(Axis::Elevation);
        let azimuth = self.link.read_angle(Axis::Azimuth);
        let link = self.link.status();

        if !elevation.crc_valid || !azimuth.crc_valid {
            warn!(
                "encoder frame flagged invalid (elevation: {}, azimuth: {})",
                elevation.crc_valid, azimuth.crc_valid
            );
        }

        let voltage = self.voltage_filter.push(self.frontend.read_voltage()?);
        let current = self.current_filter.push(self.frontend.read_current()?);

        let switches = switch_status(&mut self.switches);

        Ok(CycleReadings {
            elevation,
            azimuth,
            voltage,
            current,
            switches,
            link,
        })
    }

    /// Snapshot of the sensor-link communication status
    pub fn link_status(&self) -> CommunicationStatus {
        self.link.status()
    }

    /// Clears the sticky link warning (operator path)
    pub fn clear_link_warning(&mut self) {
        self.link.clear_warning();
    }
}
