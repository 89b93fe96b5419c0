/// Hardware side of the six outputs.
///
/// One entry point per physical output, called in panel order by
/// [`Outputs::update()`](super::Outputs::update) once per control cycle.
/// Output 4 is the DAC and takes the full 12-bit code; the others are
/// clock/gate outputs driven from a byte. Calls are fire-and-forget: there
/// is no way to report a failure back to the commit loop.
///
/// The engine saturates values wider than a byte to `u8::MAX` before
/// calling the narrow entry points, so a non-zero gate stays non-zero.
///
/// # Example
///
/// ```
/// use tu_outputs::outputs::OutputSink;
///
/// #[derive(Default)]
/// struct Gates([bool; 6], u16);
///
/// impl OutputSink for Gates {
///     fn set_output1(&mut self, data: u8) { self.0[0] = data > 0; }
///     fn set_output2(&mut self, data: u8) { self.0[1] = data > 0; }
///     fn set_output3(&mut self, data: u8) { self.0[2] = data > 0; }
///     fn set_output4(&mut self, data: u16) { self.1 = data; }
///     fn set_output5(&mut self, data: u8) { self.0[4] = data > 0; }
///     fn set_output6(&mut self, data: u8) { self.0[5] = data > 0; }
/// }
/// ```
pub trait OutputSink {
    fn set_output1(&mut self, data: u8);
    fn set_output2(&mut self, data: u8);
    fn set_output3(&mut self, data: u8);
    /// DAC output.
    fn set_output4(&mut self, data: u16);
    fn set_output5(&mut self, data: u8);
    fn set_output6(&mut self, data: u8);
}
