//! Operator input
//!
//! Raw samples (two joystick axes plus buttons) come from an
//! [`InputSource`](crate::traits::InputSource). This module maps axes to
//! channel directions and turns button levels into press edges.

pub mod buttons;
pub mod mapping;

pub use buttons::{Button, ButtonEdges, Buttons};
pub use mapping::{AxisBands, AxisMapping, InputMapper, DEFAULT_FULL_SCALE};

/// One raw input sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSample {
    /// Raw axis readings, axis 1 first
    pub axes: [u16; 2],
    /// Button levels
    pub buttons: Buttons,
}

impl InputSample {
    /// Both axes at rest, nothing pressed
    pub const fn centered(full_scale: u16) -> Self {
        let center = ((full_scale as u32 + 1) / 2) as u16;
        Self {
            axes: [center, center],
            buttons: Buttons::NONE,
        }
    }

    /// Centered axes with one button held
    pub fn pressing(button: Button) -> Self {
        Self {
            buttons: Buttons::only(button),
            ..Self::default()
        }
    }
}

impl Default for InputSample {
    fn default() -> Self {
        Self::centered(DEFAULT_FULL_SCALE)
    }
}
