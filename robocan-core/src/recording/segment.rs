//! Recorded motion segments

use serde::{Deserialize, Serialize};

use crate::traits::{Channel, Direction};

/// A single recorded segment
///
/// Segments are the atomic units of a recording: one continuous interval
/// during which both channel directions stayed the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Direction of channel 1
    pub dir1: Direction,
    /// Direction of channel 2
    pub dir2: Direction,
    /// Steps emitted on channel 1 during the interval
    pub pulses1: u32,
    /// Steps emitted on channel 2 during the interval
    pub pulses2: u32,
    /// Wall-clock length of the interval in milliseconds
    pub duration_ms: u32,
}

impl Segment {
    /// Create a segment
    ///
    /// Pulse counts of stopped channels are forced to zero.
    pub fn new(
        dir1: Direction,
        dir2: Direction,
        pulses1: u32,
        pulses2: u32,
        duration_ms: u32,
    ) -> Self {
        Self {
            dir1,
            dir2,
            pulses1: if dir1.is_moving() { pulses1 } else { 0 },
            pulses2: if dir2.is_moving() { pulses2 } else { 0 },
            duration_ms,
        }
    }

    /// A pure dwell of `duration_ms` with both channels still
    #[cfg(test)]
    pub fn dwell(duration_ms: u32) -> Self {
        Self::new(Direction::Stop, Direction::Stop, 0, 0, duration_ms)
    }

    /// Direction of a channel
    pub fn direction(&self, channel: Channel) -> Direction {
        match channel {
            Channel::One => self.dir1,
            Channel::Two => self.dir2,
        }
    }

    /// Pulse count of a channel
    pub fn pulses(&self, channel: Channel) -> u32 {
        match channel {
            Channel::One => self.pulses1,
            Channel::Two => self.pulses2,
        }
    }

    /// True if neither channel moved
    pub fn is_stationary(&self) -> bool {
        !self.dir1.is_moving() && !self.dir2.is_moving()
    }

    /// True if stopped channels carry no pulses
    pub fn is_consistent(&self) -> bool {
        Channel::ALL
            .iter()
            .all(|&ch| self.direction(ch).is_moving() || self.pulses(ch) == 0)
    }

    /// Number of playback ticks (the larger of the two pulse counts)
    pub fn max_pulses(&self) -> u32 {
        self.pulses1.max(self.pulses2)
    }

    /// Time budget per playback tick in microseconds
    ///
    /// `None` for a segment without pulses, which plays back as a dwell.
    pub fn tick_period_us(&self) -> Option<u64> {
        match self.max_pulses() {
            0 => None,
            ticks => Some(self.duration_ms as u64 * 1_000 / ticks as u64),
        }
    }
}
