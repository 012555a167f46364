//! # Towertop Node
//!
//! Tower-top sensor node: SSI angle encoders, solar-panel monitoring and
//! framed serial telemetry.
//!
//! Runs the acquisition pipeline at a fixed cadence against the bench rig
//! and emits one telemetry line per cycle over the downlink serial port
//! (falling back to stdout when no port is attached).

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use towertop_node::acquisition::SensorNode;
use towertop_node::config::Config;
use towertop_node::hal::sim::{SimBus, SimConverter, SimSwitches};
use towertop_node::serial::sink::{StdoutSink, TelemetrySink};
use towertop_node::serial::TelemetrySerial;

/// Configuration file consulted when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the tower-top node
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (file path from argv, defaults otherwise)
///    - Open the telemetry downlink, falling back to stdout
///
/// 2. **Main Loop**
///    - Run one acquisition cycle per period (default 100 ms)
///    - Render and transmit the telemetry frame
///    - Log status periodically and on link degradation
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration file is invalid or a telemetry frame
/// cannot be built from the cycle's readings.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Towertop node v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => match Config::load(DEFAULT_CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "No usable config at {} ({}); using built-in defaults",
                    DEFAULT_CONFIG_PATH, e
                );
                Config::default()
            }
        },
    };

    let mut sink: Box<dyn TelemetrySink> = match TelemetrySerial::open(&config.serial) {
        Ok(serial) => {
            info!("Telemetry downlink at {}", serial.device_path());
            Box::new(serial)
        }
        Err(e) => {
            warn!("No downlink serial port ({}); writing frames to stdout", e);
            Box::new(StdoutSink::new())
        }
    };

    let mut node = SensorNode::new(
        SimBus::new(config.link.error_latch_count),
        SimConverter::new(&config.analog),
        SimSwitches,
        &config,
    );

    let mut cycle_interval = interval(Duration::from_millis(config.acquisition.cycle_period_ms));

    info!(
        "Starting acquisition loop at {} ms per cycle",
        config.acquisition.cycle_period_ms
    );
    info!("Press Ctrl+C to exit");

    let mut cycle_count: u64 = 0;
    let mut warned_link = false;

    // Main acquisition loop
    loop {
        tokio::select! {
            _ = cycle_interval.tick() => {
                let readings = match node.run_cycle() {
                    Ok(readings) => readings,
                    Err(e) => {
                        warn!("Acquisition cycle failed: {}", e);
                        continue;
                    }
                };

                let line = readings.frame()?.render();
                if let Err(e) = sink.write_line(&line).await {
                    warn!("Failed to send frame: {}", e);
                    continue;
                }

                if readings.link.warning && !warned_link {
                    warn!("Sensor link degraded (sticky warning set)");
                    warned_link = true;
                }

                cycle_count += 1;
                if cycle_count % config.acquisition.log_interval_cycles == 0 {
                    info!(
                        "Cycle {}: elevation {}.{:02} deg, azimuth {}.{:02} deg, {} cV, {} cA",
                        cycle_count,
                        readings.elevation.angle_cdeg / 100,
                        readings.elevation.angle_cdeg % 100,
                        readings.azimuth.angle_cdeg / 100,
                        readings.azimuth.angle_cdeg % 100,
                        readings.voltage,
                        readings.current,
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total cycles: {}", cycle_count);
                break;
            }
        }
    }

    sink.flush().await?;
    Ok(())
}
