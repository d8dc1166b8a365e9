//! Operator input source trait

use crate::input::InputSample;

/// Source of raw operator input (joystick axes and buttons)
///
/// Sampling is synchronous so it can also be polled between playback ticks.
pub trait InputSource {
    /// Read both axes and all buttons
    fn sample(&mut self) -> InputSample;

    /// Check whether the abort button is currently held
    ///
    /// Polled once per playback tick. Override when reading a single button
    /// is cheaper than a full sample.
    fn abort_pressed(&mut self) -> bool {
        self.sample().buttons.abort
    }
}
