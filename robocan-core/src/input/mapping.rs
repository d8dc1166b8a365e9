//! Joystick axis to channel direction mapping

use crate::traits::Direction;

/// Default converter full scale (12-bit ADC)
pub const DEFAULT_FULL_SCALE: u16 = 4095;

/// Threshold bands for one axis, in permille of full scale
///
/// Above `forward_permille` reads as forward, below `reverse_permille` as
/// reverse, anything in between as stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisBands {
    /// Raw value at full deflection
    pub full_scale: u16,
    /// Upper threshold
    pub forward_permille: u16,
    /// Lower threshold
    pub reverse_permille: u16,
}

impl Default for AxisBands {
    fn default() -> Self {
        Self {
            full_scale: DEFAULT_FULL_SCALE,
            forward_permille: 600,
            reverse_permille: 400,
        }
    }
}

impl AxisBands {
    /// Classify a raw axis reading
    pub fn band(&self, raw: u16) -> Direction {
        let scaled = raw as u32 * 1000;
        let full = self.full_scale as u32;
        if scaled > self.forward_permille as u32 * full {
            Direction::Forward
        } else if scaled < self.reverse_permille as u32 * full {
            Direction::Reverse
        } else {
            Direction::Stop
        }
    }

    /// Raw reading at the middle of the stop band
    pub fn center(&self) -> u16 {
        ((self.full_scale as u32 + 1) / 2) as u16
    }
}

/// How the two axes drive the two channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisMapping {
    /// Axis 1 drives channel 1, axis 2 drives channel 2
    Independent,
    /// Axis 1 is throttle for both channels; axis 2 steers by stopping
    /// channel 1 (deflected forward) or channel 2 (deflected back)
    #[default]
    Differential,
}

/// Turns raw axis readings into per-channel directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputMapper {
    pub bands: AxisBands,
    pub mapping: AxisMapping,
}

impl InputMapper {
    pub const fn new(bands: AxisBands, mapping: AxisMapping) -> Self {
        Self { bands, mapping }
    }

    /// Directions for channel 1 and channel 2
    pub fn map(&self, axes: [u16; 2]) -> (Direction, Direction) {
        let first = self.bands.band(axes[0]);
        let second = self.bands.band(axes[1]);

        match self.mapping {
            AxisMapping::Independent => (first, second),
            AxisMapping::Differential => match second {
                Direction::Forward => (Direction::Stop, first),
                Direction::Reverse => (first, Direction::Stop),
                Direction::Stop => (first, first),
            },
        }
    }
}
