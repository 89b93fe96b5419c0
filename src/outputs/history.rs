use core::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use super::channel::Channel;
use super::{HISTORY_DEPTH, NUM_CHANNELS};

/// Fixed-depth sample history for the scope display.
///
/// One ring of [`HISTORY_DEPTH`] samples per channel, sharing a single
/// tail index. The tail is the slot most recently written; the slot after
/// it is the next to be overwritten and therefore the oldest sample.
///
/// The buffer is always considered full. Before the first appends a read
/// returns the zero-initialised slots.
///
/// # Memory ordering
///
/// There is exactly one producer ([`Outputs::update()`](super::Outputs::update)).
/// It computes the next tail into a local, writes the sample, and then
/// publishes the tail with one `Release` store, so the index is never seen
/// half-updated. A reader `Acquire`-loads the tail once and then copies the
/// samples; every sample published up to that tail is visible. If the
/// producer runs again mid-copy, the oldest slot may already hold the newer
/// sample. Individual samples are never torn.
pub struct History {
    samples: [[AtomicU16; HISTORY_DEPTH]; NUM_CHANNELS],
    tail: AtomicUsize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub const fn new() -> Self {
        Self {
            samples: [const { [const { AtomicU16::new(0) }; HISTORY_DEPTH] }; NUM_CHANNELS],
            tail: AtomicUsize::new(0),
        }
    }

    /// Index of the most recently written slot, always `< HISTORY_DEPTH`.
    pub fn tail(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Write `sample` into the next slot of `channel` and advance the tail.
    ///
    /// Single producer only.
    pub(crate) fn append(&self, channel: Channel, sample: u16) {
        let next = (self.tail.load(Ordering::Relaxed) + 1) % HISTORY_DEPTH;
        self.samples[channel.index()][next].store(sample, Ordering::Relaxed);
        self.tail.store(next, Ordering::Release);
    }

    /// Copy the retained samples of `channel` into `dst`, oldest first.
    ///
    /// Always writes exactly [`HISTORY_DEPTH`] samples.
    pub fn read_chronological(&self, channel: Channel, dst: &mut [u16; HISTORY_DEPTH]) {
        let head = (self.tail() + 1) % HISTORY_DEPTH;
        let ring = &self.samples[channel.index()];

        let (older, newer) = dst.split_at_mut(HISTORY_DEPTH - head);
        for (d, s) in older.iter_mut().zip(&ring[head..]) {
            *d = s.load(Ordering::Relaxed);
        }
        for (d, s) in newer.iter_mut().zip(&ring[..head]) {
            *d = s.load(Ordering::Relaxed);
        }
    }

    /// Convenience wrapper around [`read_chronological()`](Self::read_chronological).
    pub fn snapshot(&self, channel: Channel) -> [u16; HISTORY_DEPTH] {
        let mut out = [0; HISTORY_DEPTH];
        self.read_chronological(channel, &mut out);
        out
    }
}
