//! Per-channel step counters

use crate::traits::Channel;

/// Count of step pulses emitted on each channel since the last reset
///
/// Live drive increments these; the recorder reads deltas between
/// window boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepCounters {
    counts: [u32; 2],
}

impl StepCounters {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self { counts: [0; 2] }
    }

    /// Zero both counters
    pub fn reset(&mut self) {
        self.counts = [0; 2];
    }

    /// Count one emitted pulse
    pub fn increment(&mut self, channel: Channel) {
        let count = &mut self.counts[channel.index()];
        *count = count.wrapping_add(1);
    }

    /// Current count of a channel
    pub fn get(&self, channel: Channel) -> u32 {
        self.counts[channel.index()]
    }

    /// Both counts, indexed by [`Channel::index`]
    pub fn snapshot(&self) -> [u32; 2] {
        self.counts
    }
}
