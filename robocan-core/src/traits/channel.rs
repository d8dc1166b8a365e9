//! Step channel driver trait
//!
//! This trait abstracts over step/dir/enable stepper drivers
//! (TB6600, A4988, DRV8825, ...).

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the two step channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// First channel (left side of a differential drive)
    One,
    /// Second channel (right side of a differential drive)
    Two,
}

impl Channel {
    /// Both channels, in index order
    pub const ALL: [Channel; 2] = [Channel::One, Channel::Two];

    /// Zero-based index of this channel
    pub const fn index(self) -> usize {
        match self {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }
}

/// Commanded direction of a single channel
///
/// Stored on the wire as a signed byte: -1, 0 or +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(into = "i8", try_from = "i8")]
#[repr(i8)]
pub enum Direction {
    /// Stepping backwards
    Reverse = -1,
    /// Channel held still
    #[default]
    Stop = 0,
    /// Stepping forwards
    Forward = 1,
}

impl Direction {
    /// Signed unit value of this direction
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// True unless the channel is stopped
    pub const fn is_moving(self) -> bool {
        !matches!(self, Direction::Stop)
    }

    /// Level of the direction line: only `Forward` drives it forward
    pub const fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// A byte that is not -1, 0 or +1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidDirection(pub i8);

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid direction {}", self.0)
    }
}

impl From<Direction> for i8 {
    fn from(dir: Direction) -> Self {
        dir.as_i8()
    }
}

impl TryFrom<i8> for Direction {
    type Error = InvalidDirection;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Reverse),
            0 => Ok(Direction::Stop),
            1 => Ok(Direction::Forward),
            other => Err(InvalidDirection(other)),
        }
    }
}

/// Trait for a pair of step/dir/enable channels
///
/// All methods are synchronous. `pulse` blocks for one fixed pulse width,
/// which must be small relative to the playback tick period.
pub trait ChannelDriver {
    /// Set the direction line of a channel
    fn set_direction(&mut self, channel: Channel, forward: bool);

    /// Enable or disable a channel
    ///
    /// When disabled, the motor is free to rotate and does not hold position.
    fn set_enabled(&mut self, channel: Channel, enabled: bool);

    /// Emit exactly one step pulse on a channel
    fn pulse(&mut self, channel: Channel);

    /// Emit one step on each selected channel within the same tick
    ///
    /// Drivers that can raise both step lines together should override this.
    fn pulse_pair(&mut self, first: bool, second: bool) {
        if first {
            self.pulse(Channel::One);
        }
        if second {
            self.pulse(Channel::Two);
        }
    }

    /// Set direction line and enable from a commanded direction
    fn apply(&mut self, channel: Channel, direction: Direction) {
        self.set_direction(channel, direction.is_forward());
        self.set_enabled(channel, direction.is_moving());
    }

    /// Disable both channels
    fn disable_all(&mut self) {
        for channel in Channel::ALL {
            self.set_enabled(channel, false);
        }
    }
}

impl<T: ChannelDriver + ?Sized> ChannelDriver for &mut T {
    fn set_direction(&mut self, channel: Channel, forward: bool) {
        (**self).set_direction(channel, forward)
    }

    fn set_enabled(&mut self, channel: Channel, enabled: bool) {
        (**self).set_enabled(channel, enabled)
    }

    fn pulse(&mut self, channel: Channel) {
        (**self).pulse(channel)
    }

    fn pulse_pair(&mut self, first: bool, second: bool) {
        (**self).pulse_pair(first, second)
    }
}
