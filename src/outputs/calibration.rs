use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use super::channel::Channel;
use super::config::OutputConfig;
use super::error::OutputError;
use super::{CALIBRATION_POINTS, NUM_DACS};

/// Raw DAC codes measured at the calibration reference voltages.
///
/// Owned by the caller (usually a `static`), written by the calibration
/// procedure and read by [`CalibrationStore`]. Cells are atomics so the
/// calibration procedure can write through a shared reference while the
/// engine holds one too.
///
/// Points are expected to be non-decreasing in index order. That is not
/// enforced; see [`is_monotonic()`](Self::is_monotonic).
pub struct CalibrationData {
    points: [[AtomicU16; CALIBRATION_POINTS]; NUM_DACS],
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationData {
    /// All points zero. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            points: [const { [const { AtomicU16::new(0) }; CALIBRATION_POINTS] }; NUM_DACS],
        }
    }

    /// Build from a table of already-measured points.
    pub fn from_points(points: [[u16; CALIBRATION_POINTS]; NUM_DACS]) -> Self {
        let data = Self::new();
        for (row, codes) in data.points.iter().zip(points.iter()) {
            for (cell, &code) in row.iter().zip(codes.iter()) {
                cell.store(code, Ordering::Relaxed);
            }
        }
        data
    }

    /// Read one calibration point.
    pub fn point(&self, dac: usize, index: usize) -> Result<u16, OutputError> {
        let row = self.points.get(dac).ok_or(OutputError::InvalidDac)?;
        let cell = row.get(index).ok_or(OutputError::InvalidCalibrationPoint)?;
        Ok(cell.load(Ordering::Relaxed))
    }

    /// Write one calibration point.
    ///
    /// The derived octave scale is **not** refreshed; call
    /// [`CalibrationStore::compute_octave_scale()`] once the procedure is done.
    pub fn set_point(&self, dac: usize, index: usize, code: u16) -> Result<(), OutputError> {
        let row = self.points.get(dac).ok_or(OutputError::InvalidDac)?;
        let cell = row.get(index).ok_or(OutputError::InvalidCalibrationPoint)?;
        cell.store(code, Ordering::Relaxed);
        Ok(())
    }

    /// Replace all points of one DAC.
    pub fn set_points(&self, dac: usize, codes: [u16; CALIBRATION_POINTS]) -> Result<(), OutputError> {
        let row = self.points.get(dac).ok_or(OutputError::InvalidDac)?;
        for (cell, code) in row.iter().zip(codes) {
            cell.store(code, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Snapshot all points of one DAC.
    pub fn points(&self, dac: usize) -> Result<[u16; CALIBRATION_POINTS], OutputError> {
        let row = self.points.get(dac).ok_or(OutputError::InvalidDac)?;
        Ok(core::array::from_fn(|i| row[i].load(Ordering::Relaxed)))
    }

    /// `true` if the points of `dac` never decrease with index.
    ///
    /// Returns `false` for an out-of-range `dac`.
    pub fn is_monotonic(&self, dac: usize) -> bool {
        match self.points(dac) {
            Ok(points) => points.windows(2).all(|w| w[0] <= w[1]),
            Err(_) => false,
        }
    }
}

/// Derives the zero-volt offset and octave scale from [`CalibrationData`].
///
/// The octave scale is a cached value: it is only recomputed when
/// [`compute_octave_scale()`](Self::compute_octave_scale) is called, never
/// when the underlying points change.
pub struct CalibrationStore<'a> {
    data: &'a CalibrationData,
    config: OutputConfig,
    octave_scale: AtomicU16,
    calibrated: AtomicBool,
}

/// The engine only calibrates one DAC, always row 0.
const PITCH_DAC: usize = 0;

impl<'a> CalibrationStore<'a> {
    /// Bind to caller-owned calibration data. Nothing is copied and the
    /// octave scale starts at 0 (uncalibrated).
    pub fn new(data: &'a CalibrationData, config: OutputConfig) -> Self {
        Self {
            data,
            config,
            octave_scale: AtomicU16::new(0),
            calibrated: AtomicBool::new(false),
        }
    }

    /// The calibration data this store reads from.
    pub fn data(&self) -> &'a CalibrationData {
        self.data
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Recompute the octave scale from the current calibration points.
    ///
    /// The scale is the mean difference between adjacent points, accumulated
    /// in `f32` and rounded half up. Non-monotonic points are logged but
    /// still used; a negative mean saturates to 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use tu_outputs::outputs::{CalibrationData, CalibrationStore, OutputConfig};
    ///
    /// let data = CalibrationData::from_points([[100, 300, 500, 700, 900]]);
    /// let store = CalibrationStore::new(&data, OutputConfig::default());
    /// assert_eq!(store.compute_octave_scale(), 200);
    /// assert_eq!(store.octave_scale(), 200);
    /// ```
    pub fn compute_octave_scale(&self) -> u16 {
        let points = self.pitch_points();

        if !points.windows(2).all(|w| w[0] <= w[1]) {
            #[cfg(feature = "defmt")]
            defmt::warn!("calibration points are not monotonic: {}", points);
        }

        let mut sum = 0.0f32;
        for w in points.windows(2) {
            sum += (i32::from(w[1]) - i32::from(w[0])) as f32;
        }
        let mean = sum / (CALIBRATION_POINTS - 1) as f32;
        let scale = (0.5 + mean) as u16;

        self.octave_scale.store(scale, Ordering::Relaxed);
        self.calibrated.store(true, Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::info!("octave scale computed: {}", scale);

        scale
    }

    /// Last computed octave scale, or 0 if it was never computed.
    pub fn octave_scale(&self) -> u16 {
        self.octave_scale.load(Ordering::Relaxed)
    }

    /// `true` once [`compute_octave_scale()`](Self::compute_octave_scale) has run.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated.load(Ordering::Acquire)
    }

    /// Like [`octave_scale()`](Self::octave_scale), but refuses to hand out
    /// a scale that was never computed.
    pub fn try_octave_scale(&self) -> Result<u16, OutputError> {
        if self.is_calibrated() {
            Ok(self.octave_scale())
        } else {
            Err(OutputError::NotCalibrated)
        }
    }

    /// Zero-volt code for `channel`: the configured 0 V calibration point
    /// for the pitch channel, 0 for every other channel.
    pub fn zero_offset(&self, channel: Channel) -> u32 {
        if channel == self.config.pitch_channel {
            let points = self.pitch_points();
            points
                .get(self.config.zero_octave_index)
                .copied()
                .map_or(0, u32::from)
        } else {
            0
        }
    }

    /// Output code `octaves` octaves away from the channel's zero offset.
    ///
    /// Clamped at 0 from below; the upper bound is applied when the code is
    /// staged.
    pub fn octave_code(&self, channel: Channel, octaves: i32) -> u32 {
        let delta = octaves.saturating_mul(i32::from(self.octave_scale()));
        self.offset_code(channel, delta)
    }

    /// Output code `semitones` semitones away from the channel's zero
    /// offset (1 V/octave, twelve-tone equal temperament).
    pub fn semitone_code(&self, channel: Channel, semitones: i32) -> u32 {
        let delta = semitones.saturating_mul(i32::from(self.octave_scale())) / 12;
        self.offset_code(channel, delta)
    }

    fn offset_code(&self, channel: Channel, delta: i32) -> u32 {
        let zero = self.zero_offset(channel) as i32;
        zero.saturating_add(delta).max(0) as u32
    }

    fn pitch_points(&self) -> [u16; CALIBRATION_POINTS] {
        let row = &self.data.points[PITCH_DAC];
        core::array::from_fn(|i| row[i].load(Ordering::Relaxed))
    }
}
