use super::error::OutputError;
use super::NUM_CHANNELS;

/// One of the six physical outputs, numbered as on the panel.
///
/// Using an enum instead of a raw index makes every channel access in the
/// engine valid by construction. Callers that hold a raw index (menus,
/// settings) convert with [`Channel::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    Ch1 = 0,
    Ch2 = 1,
    Ch3 = 2,
    Ch4 = 3,
    Ch5 = 4,
    Ch6 = 5,
}

impl Channel {
    /// All channels in commit order.
    pub const ALL: [Channel; NUM_CHANNELS] = [
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
        Channel::Ch5,
        Channel::Ch6,
    ];

    /// Zero-based array index of this channel.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Channel {
    type Error = OutputError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Channel::ALL
            .get(index)
            .copied()
            .ok_or(OutputError::InvalidChannel)
    }
}

impl From<Channel> for usize {
    fn from(channel: Channel) -> Self {
        channel.index()
    }
}
