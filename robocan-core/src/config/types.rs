//! Configuration type definitions
//!
//! These types describe one machine: pin assignments, input thresholds and
//! control timing. They are filled from `machine.toml` by
//! [`parse_config`](super::parse_config).

use crate::input::{AxisBands, AxisMapping, Button, InputMapper, DEFAULT_FULL_SCALE};
use crate::playback::engine::DEFAULT_SEGMENT_GAP_MS;

/// Highest GPIO number on the target
pub const MAX_GPIO: u8 = 29;

/// GPIOs reserved for the joystick ADC channels
pub const AXIS_PINS: [u8; 2] = [26, 27];

/// Pin configuration
///
/// Written in config files as `"gpio4"`, with `!` for active-low and `^`
/// for the internal pull-up, e.g. `"^!gpio10"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Active-low input with pull-up (button to ground)
    pub const fn button(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// Step driver pins of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPins {
    /// Step pulse pin
    pub step_pin: PinConfig,
    /// Direction pin; `inverted` flips which level means forward
    pub dir_pin: PinConfig,
    /// Enable pin (TB6600 ENA is active-low)
    pub enable_pin: PinConfig,
}

impl ChannelPins {
    pub const fn new(step: u8, dir: u8, enable: u8) -> Self {
        Self {
            step_pin: PinConfig::new(step),
            dir_pin: PinConfig::new(dir),
            enable_pin: PinConfig::inverted(enable),
        }
    }
}

/// Step driver timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Step line high time, and low time after it, in microseconds
    pub pulse_width_us: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { pulse_width_us: 200 }
    }
}

/// Playback timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackConfig {
    /// Pause after every replayed segment
    pub segment_gap_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            segment_gap_ms: DEFAULT_SEGMENT_GAP_MS,
        }
    }
}

/// Joystick interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Raw reading at full deflection
    pub full_scale: u16,
    /// Forward threshold in permille of full scale
    pub forward_permille: u16,
    /// Reverse threshold in permille of full scale
    pub reverse_permille: u16,
    /// Axis to channel mapping
    pub mapping: AxisMapping,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            full_scale: DEFAULT_FULL_SCALE,
            forward_permille: 600,
            reverse_permille: 400,
            mapping: AxisMapping::Differential,
        }
    }
}

impl InputConfig {
    /// Build the axis mapper for this configuration
    pub fn mapper(&self) -> InputMapper {
        InputMapper::new(
            AxisBands {
                full_scale: self.full_scale,
                forward_permille: self.forward_permille,
                reverse_permille: self.reverse_permille,
            },
            self.mapping,
        )
    }
}

/// Control loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConfig {
    /// Delay between control loop iterations
    pub loop_interval_ms: u32,
    /// Window for the second delete press
    pub delete_confirm_ms: u32,
    /// Minimum interval between status refreshes
    pub status_refresh_ms: u32,
    /// How long the "deleted" notice stays up
    pub notice_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            loop_interval_ms: 5,
            delete_confirm_ms: 2000,
            status_refresh_ms: 200,
            notice_ms: 800,
        }
    }
}

/// Button input pins; unset buttons never read as pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonPins {
    pub record: Option<PinConfig>,
    pub mark: Option<PinConfig>,
    pub play_forward: Option<PinConfig>,
    pub play_reverse: Option<PinConfig>,
    pub abort: Option<PinConfig>,
    pub delete: Option<PinConfig>,
    pub save: Option<PinConfig>,
    pub load: Option<PinConfig>,
}

impl Default for ButtonPins {
    fn default() -> Self {
        Self {
            record: Some(PinConfig::button(10)),
            mark: Some(PinConfig::button(11)),
            play_forward: Some(PinConfig::button(12)),
            play_reverse: Some(PinConfig::button(13)),
            abort: Some(PinConfig::button(14)),
            delete: Some(PinConfig::button(15)),
            save: Some(PinConfig::button(16)),
            load: Some(PinConfig::button(17)),
        }
    }
}

impl ButtonPins {
    /// Pin of one button
    pub fn get(&self, button: Button) -> Option<PinConfig> {
        match button {
            Button::Record => self.record,
            Button::Mark => self.mark,
            Button::PlayForward => self.play_forward,
            Button::PlayReverse => self.play_reverse,
            Button::Abort => self.abort,
            Button::Delete => self.delete,
            Button::Save => self.save,
            Button::Load => self.load,
        }
    }

    /// Slot for one button
    pub fn slot_mut(&mut self, button: Button) -> &mut Option<PinConfig> {
        match button {
            Button::Record => &mut self.record,
            Button::Mark => &mut self.mark,
            Button::PlayForward => &mut self.play_forward,
            Button::PlayReverse => &mut self.play_reverse,
            Button::Abort => &mut self.abort,
            Button::Delete => &mut self.delete,
            Button::Save => &mut self.save,
            Button::Load => &mut self.load,
        }
    }
}

/// Why a configuration was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// `full_scale` is zero
    ZeroFullScale,
    /// A threshold is above 1000 permille
    ThresholdRange,
    /// `reverse_permille` is not below `forward_permille`
    ThresholdOrder,
    /// Pin number beyond the last GPIO or on an ADC axis
    PinUnavailable(u8),
    /// Pin assigned twice
    PinConflict(u8),
    /// `pulse_width_us` is zero
    ZeroPulseWidth,
    /// `loop_interval_ms` is zero
    ZeroLoopInterval,
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineConfig {
    pub driver: DriverConfig,
    pub playback: PlaybackConfig,
    pub input: InputConfig,
    pub control: ControlConfig,
    /// Channel 1 and channel 2 pins
    pub channels: [ChannelPins; 2],
    pub buttons: ButtonPins,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            playback: PlaybackConfig::default(),
            input: InputConfig::default(),
            control: ControlConfig::default(),
            channels: [ChannelPins::new(2, 3, 4), ChannelPins::new(6, 7, 8)],
            buttons: ButtonPins::default(),
        }
    }
}

impl MachineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check value ranges and pin assignments
    pub fn validate(&self) -> Result<(), ValidationError> {
        let input = &self.input;
        if input.full_scale == 0 {
            return Err(ValidationError::ZeroFullScale);
        }
        if input.forward_permille > 1000 || input.reverse_permille > 1000 {
            return Err(ValidationError::ThresholdRange);
        }
        if input.reverse_permille >= input.forward_permille {
            return Err(ValidationError::ThresholdOrder);
        }
        if self.driver.pulse_width_us == 0 {
            return Err(ValidationError::ZeroPulseWidth);
        }
        if self.control.loop_interval_ms == 0 {
            return Err(ValidationError::ZeroLoopInterval);
        }

        // Bit per GPIO already claimed
        let mut used: u32 = 0;
        for pin in self.pins() {
            if pin > MAX_GPIO || AXIS_PINS.contains(&pin) {
                return Err(ValidationError::PinUnavailable(pin));
            }
            let bit = 1u32 << pin;
            if used & bit != 0 {
                return Err(ValidationError::PinConflict(pin));
            }
            used |= bit;
        }

        Ok(())
    }

    /// Every configured digital pin number
    fn pins(&self) -> impl Iterator<Item = u8> + '_ {
        let channel_pins = self
            .channels
            .iter()
            .flat_map(|c| [c.step_pin.pin, c.dir_pin.pin, c.enable_pin.pin]);
        let button_pins = Button::ALL
            .into_iter()
            .filter_map(|b| self.buttons.get(b).map(|p| p.pin));
        channel_pins.chain(button_pins)
    }
}
