use core::sync::atomic::{AtomicU32, Ordering};

use super::channel::Channel;
use super::{saturate, NUM_CHANNELS};

/// Staged per-channel values and states.
///
/// Both arrays are saturated to `[0, MAX_VALUE]` on every write. The value
/// is what [`Outputs::update()`](super::Outputs::update) sends to the
/// hardware; the state is an auxiliary gate/trigger word that the UI reads
/// but the commit loop does not.
///
/// Each cell is written by its owning caller and read by anyone. Stores are
/// single-word and never torn.
pub struct ChannelValues {
    values: [AtomicU32; NUM_CHANNELS],
    states: [AtomicU32; NUM_CHANNELS],
}

impl Default for ChannelValues {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelValues {
    /// All values and states zero.
    pub const fn new() -> Self {
        Self {
            values: [const { AtomicU32::new(0) }; NUM_CHANNELS],
            states: [const { AtomicU32::new(0) }; NUM_CHANNELS],
        }
    }

    /// Stage `value` for `channel`, clamped to `MAX_VALUE`.
    #[inline]
    pub fn set(&self, channel: Channel, value: u32) {
        self.values[channel.index()].store(saturate(value), Ordering::Relaxed);
    }

    /// Set the auxiliary state of `channel`, clamped to `MAX_VALUE`.
    #[inline]
    pub fn set_state(&self, channel: Channel, value: u32) {
        self.states[channel.index()].store(saturate(value), Ordering::Relaxed);
    }

    #[inline]
    pub fn value(&self, channel: Channel) -> u32 {
        self.values[channel.index()].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn state(&self, channel: Channel) -> u32 {
        self.states[channel.index()].load(Ordering::Relaxed)
    }

    /// Snapshot every staged value, indexed by [`Channel::index()`].
    pub fn values(&self) -> [u32; NUM_CHANNELS] {
        core::array::from_fn(|i| self.values[i].load(Ordering::Relaxed))
    }
}
