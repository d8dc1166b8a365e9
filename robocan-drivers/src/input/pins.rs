//! Joystick and push buttons on plain pins
//!
//! Axes are read through [`AnalogInput`]; buttons through `embedded-hal`
//! input pins. A button wired to ground with a pull-up is configured as
//! inverted, so a low line reads as pressed.

use embedded_hal::digital::InputPin;
use robocan_core::config::{ButtonPins, PinConfig};
use robocan_core::input::{Button, Buttons, InputSample};
use robocan_core::traits::InputSource;
use robocan_hal::AnalogInput;

/// One button line and its polarity
pub struct ButtonLine<B> {
    pin: B,
    inverted: bool,
}

impl<B: InputPin> ButtonLine<B> {
    pub fn new(pin: B, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Logical pressed state; a failed read counts as released
    pub fn is_pressed(&mut self) -> bool {
        self.pin.is_high().is_ok_and(|high| high != self.inverted)
    }
}

/// [`InputSource`] over two analog axes and up to eight buttons
pub struct PinInputSource<A, B> {
    axes: [A; 2],
    buttons: [Option<ButtonLine<B>>; 8],
    center: u16,
}

impl<A: AnalogInput, B: InputPin> PinInputSource<A, B> {
    /// Create a source
    ///
    /// `buttons` is indexed in [`Button::ALL`] order. `center` is reported
    /// for an axis whose conversion fails.
    pub fn new(axes: [A; 2], buttons: [Option<ButtonLine<B>>; 8], center: u16) -> Self {
        Self {
            axes,
            buttons,
            center,
        }
    }

    /// Create a source from the configured button pins
    ///
    /// `make` claims the input for one configured pin. Unassigned buttons
    /// never read as pressed.
    pub fn from_config<E, F>(
        axes: [A; 2],
        pins: &ButtonPins,
        center: u16,
        mut make: F,
    ) -> Result<Self, E>
    where
        F: FnMut(PinConfig) -> Result<B, E>,
    {
        let mut buttons: [Option<ButtonLine<B>>; 8] = Default::default();
        for (slot, button) in buttons.iter_mut().zip(Button::ALL) {
            if let Some(pin) = pins.get(button) {
                *slot = Some(ButtonLine::new(make(pin)?, pin.inverted));
            }
        }
        Ok(Self::new(axes, buttons, center))
    }

    fn read_axis(&mut self, index: usize) -> u16 {
        self.axes[index].read_raw().unwrap_or(self.center)
    }

    fn pressed(&mut self, button: Button) -> bool {
        let slot = Button::ALL.iter().position(|b| *b == button);
        match slot.and_then(|i| self.buttons[i].as_mut()) {
            Some(line) => line.is_pressed(),
            None => false,
        }
    }
}

impl<A: AnalogInput, B: InputPin> InputSource for PinInputSource<A, B> {
    fn sample(&mut self) -> InputSample {
        let axes = [self.read_axis(0), self.read_axis(1)];
        let buttons = Buttons::from_fn(|button| self.pressed(button));
        InputSample { axes, buttons }
    }

    fn abort_pressed(&mut self) -> bool {
        self.pressed(Button::Abort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAxis, MockInput};
    use core::convert::Infallible;

    struct Rig {
        axes: [MockAxis; 2],
        lines: Vec<MockInput>,
    }

    fn source(pins: &ButtonPins) -> (PinInputSource<MockAxis, MockInput>, Rig) {
        let axes = [MockAxis::default(), MockAxis::default()];
        let mut lines = Vec::new();
        let source = PinInputSource::from_config(axes.clone(), pins, 2048, |_| {
            let line = MockInput::default();
            lines.push(line.clone());
            Ok::<_, Infallible>(line)
        })
        .unwrap();
        (source, Rig { axes, lines })
    }

    #[test]
    fn test_axes_and_center_fallback() {
        let (mut source, rig) = source(&ButtonPins::default());
        rig.axes[0].set(Some(4000));
        rig.axes[1].set(None);

        assert_eq!(source.sample().axes, [4000, 2048]);
    }

    #[test]
    fn test_active_low_buttons() {
        let (mut source, rig) = source(&ButtonPins::default());
        // Default buttons are pulled up and inverted; idle lines sit high
        for line in &rig.lines {
            line.set_high(true);
        }
        assert_eq!(source.sample().buttons, Buttons::NONE);

        // Record is the first configured line
        rig.lines[0].set_high(false);
        assert_eq!(source.sample().buttons, Buttons::only(Button::Record));
    }

    #[test]
    fn test_unassigned_button() {
        let mut pins = ButtonPins::default();
        *pins.slot_mut(Button::Mark) = None;
        *pins.slot_mut(Button::Record) = Some(PinConfig::new(20));
        let (mut source, rig) = source(&pins);
        assert_eq!(rig.lines.len(), 7);

        // Active-high record line
        rig.lines[0].set_high(true);
        let buttons = source.sample().buttons;
        assert!(buttons.record);
        assert!(!buttons.mark);
    }

    #[test]
    fn test_abort_reads_one_line() {
        let (mut source, rig) = source(&ButtonPins::default());
        for line in &rig.lines {
            line.set_high(true);
        }
        let abort = &rig.lines[4];

        assert!(!source.abort_pressed());
        abort.set_high(false);
        assert!(source.abort_pressed());

        let total: u32 = rig.lines.iter().map(MockInput::reads).sum();
        assert_eq!(total, 2);
        assert_eq!(abort.reads(), 2);
    }
}
