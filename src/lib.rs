//! Output engine for a six-channel Eurorack clock/CV module.
//!
//! The crate owns everything between "a task decided what an output should
//! be" and "the value reached the hardware": saturated staging of channel
//! values, DAC calibration (zero-volt code and octave scale), the per-cycle
//! commit into a hardware sink, and a short history of one channel for the
//! scope display.
//!
//! See [`outputs`] for the API.
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging and `defmt::Format` derives for
//!   embedded targets.

#![no_std]

pub mod outputs;
