use super::channel::Channel;
use super::error::OutputError;
use super::CALIBRATION_POINTS;

/// Hardware variant, which decides where 0 V sits in the calibration table.
///
/// The standard module calibrates the DAC symmetrically around 0 V
/// (-4 V … +4 V), so 0 V is the middle point. The offset variant shifts the
/// output range up by 2 V and the 2TT variant is unipolar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareModel {
    /// Bipolar DAC, 0 V at calibration point 2.
    #[default]
    Standard,
    /// Offset DAC, 0 V at calibration point 1.
    ModOffset,
    /// Unipolar 2TT DAC, 0 V at calibration point 0.
    TwoTt,
}

impl HardwareModel {
    /// Index of the calibration point that represents 0 V.
    pub const fn zero_octave_index(self) -> usize {
        match self {
            HardwareModel::Standard => 2,
            HardwareModel::ModOffset => 1,
            HardwareModel::TwoTt => 0,
        }
    }
}

/// Startup configuration of the output engine.
///
/// Resolved once when [`Outputs`](super::Outputs) is constructed and fixed
/// for the lifetime of the running system.
///
/// [`OutputConfig::default()`] matches the standard hardware: output 4 is
/// the DAC/pitch output, 0 V is calibration point 2 and output 4 feeds the
/// scope history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputConfig {
    /// The one channel backed by the calibrated DAC. Its zero offset is the
    /// 0 V calibration code; every other channel's zero offset is 0.
    pub pitch_channel: Channel,
    /// Calibration point index holding the 0 V code. Always `< CALIBRATION_POINTS`.
    pub zero_octave_index: usize,
    /// Channel appended to the history on every update.
    pub recorded_channel: Channel,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::for_model(HardwareModel::Standard)
    }
}

impl OutputConfig {
    /// Build a configuration with an explicit zero-octave index.
    ///
    /// The recorded channel defaults to the pitch channel's standard
    /// position (output 4); change the field afterwards if needed.
    ///
    /// Returns [`OutputError::InvalidCalibrationPoint`] if
    /// `zero_octave_index >= CALIBRATION_POINTS`.
    pub fn new(pitch_channel: Channel, zero_octave_index: usize) -> Result<Self, OutputError> {
        if zero_octave_index >= CALIBRATION_POINTS {
            return Err(OutputError::InvalidCalibrationPoint);
        }
        Ok(Self {
            pitch_channel,
            zero_octave_index,
            recorded_channel: Channel::Ch4,
        })
    }

    /// Configuration for one of the known hardware variants.
    pub const fn for_model(model: HardwareModel) -> Self {
        Self {
            pitch_channel: Channel::Ch4,
            zero_octave_index: model.zero_octave_index(),
            recorded_channel: Channel::Ch4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standard_model() {
        let c = OutputConfig::default();
        assert_eq!(c.pitch_channel, Channel::Ch4);
        assert_eq!(c.zero_octave_index, 2);
        assert_eq!(c.recorded_channel, Channel::Ch4);
    }

    #[test]
    fn model_zero_octave_indices() {
        assert_eq!(OutputConfig::for_model(HardwareModel::Standard).zero_octave_index, 2);
        assert_eq!(OutputConfig::for_model(HardwareModel::ModOffset).zero_octave_index, 1);
        assert_eq!(OutputConfig::for_model(HardwareModel::TwoTt).zero_octave_index, 0);
    }

    #[test]
    fn new_accepts_last_point() {
        let c = OutputConfig::new(Channel::Ch1, CALIBRATION_POINTS - 1).unwrap();
        assert_eq!(c.pitch_channel, Channel::Ch1);
        assert_eq!(c.zero_octave_index, 4);
    }

    #[test]
    fn new_rejects_out_of_range_point() {
        assert_eq!(
            OutputConfig::new(Channel::Ch4, CALIBRATION_POINTS),
            Err(OutputError::InvalidCalibrationPoint)
        );
    }
}
