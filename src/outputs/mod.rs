//! Channel staging, calibration and history for the six module outputs.
//!
//! This module provides [`Outputs`], the aggregate shared between the
//! fixed-rate control task (the producer, calling [`Outputs::update`]) and
//! the slower UI/display task (the consumer, reading values, states and the
//! scope history).
//!
//! # Architecture
//!
//! ```text
//!   callers ──set()/set_state()──▶ ChannelValues ──update()──▶ OutputSink
//!                                        │                      (6 outputs)
//!   CalibrationData ──▶ CalibrationStore │
//!   (caller-owned)      zero offset,     └──▶ History ──▶ display layer
//!                       octave scale          (8 samples)
//! ```
//!
//! Output 4 is the only DAC-backed output on the standard hardware; the
//! other five are clock/gate outputs. Which channel produces pitch, which
//! calibration point is 0 V and which channel is recorded into the history
//! is decided once at startup by [`OutputConfig`].
//!
//! # Saturation
//!
//! Every staged value and state is clamped to `[0, MAX_VALUE]` on write.
//! There is no error path for out-of-range numbers; upstream pitch maths
//! may overshoot and the stage absorbs it.
//!
//! # Concurrency
//!
//! All shared words are atomics, so `&Outputs` can be handed to several
//! tasks without a mutex. The history tail is published with a single
//! `Release` store after the sample it covers has been written; readers
//! `Acquire`-load it once per read. See [`History`] for the exact guarantee.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation. All storage is fixed-size arrays sized by the
//! constants below. Only atomic `load`/`store` are used, which every
//! Cortex-M core supports.

mod calibration;
mod channel;
mod config;
mod engine;
mod error;
mod history;
mod sink;
mod stage;

pub use calibration::{CalibrationData, CalibrationStore};
pub use channel::Channel;
pub use config::{HardwareModel, OutputConfig};
pub use engine::Outputs;
pub use error::OutputError;
pub use history::History;
pub use sink::OutputSink;
pub use stage::ChannelValues;

/// Number of logical output channels.
pub const NUM_CHANNELS: usize = 6;

/// Number of DAC-backed outputs that carry calibration data.
pub const NUM_DACS: usize = 1;

/// DAC full scale. Staged values and states never exceed this.
pub const MAX_VALUE: u32 = 4095;

/// Calibration points per DAC, measured at -4 V, -2 V, 0 V, +2 V and +4 V.
pub const CALIBRATION_POINTS: usize = 5;

/// Number of samples retained by the scope history.
pub const HISTORY_DEPTH: usize = 8;

/// Clamp a raw value into `[0, MAX_VALUE]`.
#[inline]
pub(crate) fn saturate(value: u32) -> u32 {
    value.min(MAX_VALUE)
}
