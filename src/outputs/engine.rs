use super::calibration::{CalibrationData, CalibrationStore};
use super::channel::Channel;
use super::config::OutputConfig;
use super::error::OutputError;
use super::history::History;
use super::sink::OutputSink;
use super::stage::ChannelValues;
use super::HISTORY_DEPTH;

/// The output engine: calibration, staged values and scope history.
///
/// Construct once at startup and share by reference. Every method takes
/// `&self`; see the [module docs](super) for the concurrency model.
///
/// # Examples
///
/// ```
/// use tu_outputs::outputs::{CalibrationData, Channel, OutputConfig, Outputs};
///
/// let calibration = CalibrationData::from_points([[0, 1000, 2000, 3000, 4000]]);
/// let outputs = Outputs::new(&calibration, OutputConfig::default());
///
/// assert_eq!(outputs.zero_offset(Channel::Ch4), 2000);
/// assert_eq!(outputs.compute_octave_scale(), 1000);
///
/// outputs.set(Channel::Ch4, 2000);
/// assert_eq!(outputs.value(Channel::Ch4), 2000);
/// ```
pub struct Outputs<'a> {
    calibration: CalibrationStore<'a>,
    channels: ChannelValues,
    history: History,
}

impl<'a> Outputs<'a> {
    /// Bind to caller-owned calibration data. All values, states and
    /// history samples start at 0 and the octave scale is uncalibrated.
    pub fn new(calibration: &'a CalibrationData, config: OutputConfig) -> Self {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "outputs: pitch channel {}, zero octave point {}, recording {}",
            config.pitch_channel,
            config.zero_octave_index,
            config.recorded_channel
        );

        Self {
            calibration: CalibrationStore::new(calibration, config),
            channels: ChannelValues::new(),
            history: History::new(),
        }
    }

    pub fn calibration(&self) -> &CalibrationStore<'a> {
        &self.calibration
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &OutputConfig {
        self.calibration.config()
    }

    // ── Staging ──────────────────────────────────────────────────────

    /// Stage `value` for `channel`, saturated to `MAX_VALUE`.
    pub fn set(&self, channel: Channel, value: u32) {
        self.channels.set(channel, value);
    }

    /// Set the gate/trigger state of `channel`, saturated to `MAX_VALUE`.
    pub fn set_state(&self, channel: Channel, value: u32) {
        self.channels.set_state(channel, value);
    }

    pub fn value(&self, channel: Channel) -> u32 {
        self.channels.value(channel)
    }

    pub fn state(&self, channel: Channel) -> u32 {
        self.channels.state(channel)
    }

    /// Stage every channel at its calibrated 0 V code.
    ///
    /// For the pitch channel that is the zero-octave calibration point, not
    /// raw 0.
    pub fn zero_all(&self) {
        for channel in Channel::ALL {
            self.channels.set(channel, self.calibration.zero_offset(channel));
        }
    }

    /// Stage `channel` at `octaves` octaves from its zero offset.
    pub fn set_octave(&self, channel: Channel, octaves: i32) {
        self.channels
            .set(channel, self.calibration.octave_code(channel, octaves));
    }

    /// Stage `channel` at `semitones` semitones from its zero offset.
    pub fn set_semitone(&self, channel: Channel, semitones: i32) {
        self.channels
            .set(channel, self.calibration.semitone_code(channel, semitones));
    }

    // ── Calibration ──────────────────────────────────────────────────

    /// See [`CalibrationStore::compute_octave_scale()`].
    pub fn compute_octave_scale(&self) -> u16 {
        self.calibration.compute_octave_scale()
    }

    pub fn octave_scale(&self) -> u16 {
        self.calibration.octave_scale()
    }

    pub fn try_octave_scale(&self) -> Result<u16, OutputError> {
        self.calibration.try_octave_scale()
    }

    pub fn zero_offset(&self, channel: Channel) -> u32 {
        self.calibration.zero_offset(channel)
    }

    // ── Commit ───────────────────────────────────────────────────────

    /// Push all six staged values to `sink`, then record the configured
    /// channel into the history.
    ///
    /// Runs once per control cycle. Calling it again with unchanged values
    /// re-sends the same values and records a duplicate sample.
    pub fn update<S: OutputSink>(&self, sink: &mut S) {
        let values = self.channels.values();

        sink.set_output1(narrow(values[Channel::Ch1.index()]));
        sink.set_output2(narrow(values[Channel::Ch2.index()]));
        sink.set_output3(narrow(values[Channel::Ch3.index()]));
        sink.set_output4(values[Channel::Ch4.index()] as u16);
        sink.set_output5(narrow(values[Channel::Ch5.index()]));
        sink.set_output6(narrow(values[Channel::Ch6.index()]));

        let recorded = self.config().recorded_channel;
        self.history
            .append(recorded, values[recorded.index()] as u16);
    }

    // ── History ──────────────────────────────────────────────────────

    /// Copy the history of `channel` into `dst`, oldest sample first.
    pub fn read_history(&self, channel: Channel, dst: &mut [u16; HISTORY_DEPTH]) {
        self.history.read_chronological(channel, dst);
    }
}

/// Staged values are at most 12 bits; gate outputs take a byte.
#[inline]
fn narrow(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::{HardwareModel, MAX_VALUE};

    /// Records every call in order.
    #[derive(Default)]
    struct RecordingSink {
        calls: [Option<(u8, u16)>; 12],
        count: usize,
    }

    impl RecordingSink {
        fn push(&mut self, output: u8, data: u16) {
            self.calls[self.count] = Some((output, data));
            self.count += 1;
        }

        fn calls(&self) -> &[Option<(u8, u16)>] {
            &self.calls[..self.count]
        }
    }

    impl OutputSink for RecordingSink {
        fn set_output1(&mut self, data: u8) {
            self.push(1, data.into());
        }
        fn set_output2(&mut self, data: u8) {
            self.push(2, data.into());
        }
        fn set_output3(&mut self, data: u8) {
            self.push(3, data.into());
        }
        fn set_output4(&mut self, data: u16) {
            self.push(4, data);
        }
        fn set_output5(&mut self, data: u8) {
            self.push(5, data.into());
        }
        fn set_output6(&mut self, data: u8) {
            self.push(6, data.into());
        }
    }

    fn linear_calibration() -> CalibrationData {
        CalibrationData::from_points([[0, 1000, 2000, 3000, 4000]])
    }

    // ── Staging ──────────────────────────────────────────────────────

    #[test]
    fn set_saturates_to_max_value() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        for channel in Channel::ALL {
            outputs.set(channel, 4096);
            assert_eq!(outputs.value(channel), MAX_VALUE);
            outputs.set(channel, 17);
            assert_eq!(outputs.value(channel), 17);
            outputs.set_state(channel, u32::MAX);
            assert_eq!(outputs.state(channel), MAX_VALUE);
        }
    }

    #[test]
    fn zero_all_uses_zero_offsets() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        for channel in Channel::ALL {
            outputs.set(channel, 1234);
        }

        outputs.zero_all();

        for channel in Channel::ALL {
            assert_eq!(outputs.value(channel), outputs.zero_offset(channel));
        }
        assert_eq!(outputs.value(Channel::Ch4), 2000);
        assert_eq!(outputs.value(Channel::Ch1), 0);
    }

    #[test]
    fn zero_all_leaves_states_alone() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        outputs.set_state(Channel::Ch2, 1);
        outputs.zero_all();
        assert_eq!(outputs.state(Channel::Ch2), 1);
    }

    #[test]
    fn zero_all_for_offset_model() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::for_model(HardwareModel::ModOffset));
        outputs.zero_all();
        assert_eq!(outputs.value(Channel::Ch4), 1000);
    }

    #[test]
    fn set_octave_and_semitone() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        outputs.compute_octave_scale();

        outputs.set_octave(Channel::Ch4, 1);
        assert_eq!(outputs.value(Channel::Ch4), 3000);

        outputs.set_octave(Channel::Ch4, 3);
        assert_eq!(outputs.value(Channel::Ch4), MAX_VALUE);

        outputs.set_octave(Channel::Ch4, -3);
        assert_eq!(outputs.value(Channel::Ch4), 0);

        outputs.set_semitone(Channel::Ch4, 6);
        assert_eq!(outputs.value(Channel::Ch4), 2500);
    }

    // ── Commit ───────────────────────────────────────────────────────

    #[test]
    fn update_pushes_all_outputs_in_order() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        for (i, channel) in Channel::ALL.iter().enumerate() {
            outputs.set(*channel, 10 * (i as u32 + 1));
        }

        let mut sink = RecordingSink::default();
        outputs.update(&mut sink);

        assert_eq!(
            sink.calls(),
            &[
                Some((1, 10)),
                Some((2, 20)),
                Some((3, 30)),
                Some((4, 40)),
                Some((5, 50)),
                Some((6, 60)),
            ]
        );
    }

    #[test]
    fn update_saturates_narrow_outputs() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        outputs.set(Channel::Ch1, 256);
        outputs.set(Channel::Ch4, 4095);

        let mut sink = RecordingSink::default();
        outputs.update(&mut sink);

        assert_eq!(sink.calls()[0], Some((1, 255)));
        assert_eq!(sink.calls()[3], Some((4, 4095)));
    }

    #[test]
    fn update_records_history() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        let mut sink = RecordingSink::default();

        for i in 0..HISTORY_DEPTH as u32 {
            outputs.set(Channel::Ch4, i * 100);
            sink.count = 0;
            outputs.update(&mut sink);
        }

        let mut history = [0; HISTORY_DEPTH];
        outputs.read_history(Channel::Ch4, &mut history);
        assert_eq!(history, [0, 100, 200, 300, 400, 500, 600, 700]);
    }

    #[test]
    fn repeated_update_records_duplicates() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        let mut sink = RecordingSink::default();
        let tail_before = outputs.history().tail();

        outputs.set(Channel::Ch4, 777);
        outputs.update(&mut sink);
        outputs.update(&mut sink);

        assert_eq!(
            outputs.history().tail(),
            (tail_before + 2) % HISTORY_DEPTH
        );
        let history = outputs.history().snapshot(Channel::Ch4);
        assert_eq!(history[HISTORY_DEPTH - 2..], [777, 777]);
        assert_eq!(sink.calls()[3], sink.calls()[9]);
    }

    #[test]
    fn recorded_channel_follows_config() {
        let cal = linear_calibration();
        let config = OutputConfig {
            recorded_channel: Channel::Ch2,
            ..OutputConfig::default()
        };
        let outputs = Outputs::new(&cal, config);
        let mut sink = RecordingSink::default();

        outputs.set(Channel::Ch2, 42);
        outputs.set(Channel::Ch4, 99);
        outputs.update(&mut sink);

        assert_eq!(outputs.history().snapshot(Channel::Ch2)[HISTORY_DEPTH - 1], 42);
        assert_eq!(outputs.history().snapshot(Channel::Ch4), [0; HISTORY_DEPTH]);
    }

    // ── End to end ───────────────────────────────────────────────────

    #[test]
    fn calibrate_stage_commit() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());

        assert_eq!(outputs.zero_offset(Channel::Ch4), 2000);
        assert_eq!(outputs.try_octave_scale(), Err(OutputError::NotCalibrated));
        assert_eq!(outputs.compute_octave_scale(), 1000);
        assert_eq!(outputs.octave_scale(), 1000);

        outputs.set(Channel::Ch4, 2000);
        assert_eq!(outputs.value(Channel::Ch4), 2000);

        let mut sink = RecordingSink::default();
        outputs.update(&mut sink);
        assert_eq!(sink.calls()[3], Some((4, 2000)));

        let mut history = [0; HISTORY_DEPTH];
        outputs.read_history(Channel::Ch4, &mut history);
        assert_eq!(history[HISTORY_DEPTH - 1], 2000);
    }

    #[test]
    fn recalibration_through_shared_data() {
        let cal = linear_calibration();
        let outputs = Outputs::new(&cal, OutputConfig::default());
        outputs.compute_octave_scale();

        outputs
            .calibration()
            .data()
            .set_points(0, [100, 900, 1700, 2500, 3300])
            .unwrap();
        assert_eq!(outputs.octave_scale(), 1000);
        assert_eq!(outputs.zero_offset(Channel::Ch4), 1700);

        assert_eq!(outputs.compute_octave_scale(), 800);
    }

    #[test]
    fn outputs_is_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Outputs<'static>>();
    }
}
