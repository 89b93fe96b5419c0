use core::fmt;

/// Errors returned at the boundary of the output engine.
///
/// The per-cycle path (`set`, `update`, history reads) never fails; these
/// only come from converting raw indices, writing calibration data and
/// building an [`OutputConfig`](super::OutputConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Channel index is out of bounds (must be < NUM_CHANNELS).
    InvalidChannel,
    /// DAC index is out of bounds (must be < NUM_DACS).
    InvalidDac,
    /// Calibration point index is out of bounds (must be < CALIBRATION_POINTS).
    InvalidCalibrationPoint,
    /// The octave scale was requested before it was ever computed.
    NotCalibrated,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputError::InvalidChannel => write!(f, "Invalid channel index (must be 0-5)"),
            OutputError::InvalidDac => write!(f, "Invalid DAC index"),
            OutputError::InvalidCalibrationPoint => {
                write!(f, "Invalid calibration point index (must be 0-4)")
            }
            OutputError::NotCalibrated => write!(f, "Octave scale has not been computed"),
        }
    }
}
