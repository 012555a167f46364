//! # Analog Acquisition Module
//!
//! Auto-ranging analog front-end for the solar-panel channels and the
//! per-channel moving-average smoothing applied to its output.

pub mod filter;
pub mod frontend;

pub use filter::MovingAverage;
pub use frontend::AnalogFrontEnd;
