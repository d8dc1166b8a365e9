//! Analog input abstractions
//!
//! Joystick axes are read as raw converter counts. `embedded-hal` 1.0 has no
//! ADC trait, so the chip HALs implement this one instead.

/// A single analog channel (one joystick axis)
pub trait AnalogInput {
    /// Read the raw converter value
    ///
    /// Returns `None` if the conversion failed. Callers treat a failed read
    /// as the axis resting at center.
    fn read_raw(&mut self) -> Option<u16>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    fn read_raw(&mut self) -> Option<u16> {
        (**self).read_raw()
    }
}
