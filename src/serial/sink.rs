//! Trait abstraction for the telemetry output to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;

/// Trait for telemetry line output
#[async_trait]
pub trait TelemetrySink: Send {
    /// Write one rendered telemetry line to the sink
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Sink that writes telemetry lines to standard output.
///
/// Bench fallback for hosts without the downlink serial port attached.
pub struct StdoutSink {
    out: tokio::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetrySink for StdoutSink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes()).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.out.flush().await
    }
}
