//! Dynamic pin allocation for config-driven hardware setup
//!
//! Provides a way to get GPIO pins by number at runtime, so step channels
//! and buttons can be assigned from `machine.toml`.
//!
//! The joystick ADC pins (GPIO26, GPIO27) are not in the bank; they are
//! handed out typed in [`RemainingPeripherals`] for [`crate::adc`].

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals::{ADC, DMA_CH0, FLASH, PIN_26, PIN_27};
use embassy_rp::{Peri, Peripherals};
use robocan_core::config::{PinConfig, AXIS_PINS, MAX_GPIO};

const BANK_SIZE: usize = MAX_GPIO as usize + 1;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin reserved for the joystick ADC
    Reserved(u8),
}

/// Pin bank that holds the GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; BANK_SIZE],
}

impl PinBank {
    /// Split the peripherals into a pin bank and everything else
    pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
        let bank = Self {
            pins: [
                Some(p.PIN_0.into()),
                Some(p.PIN_1.into()),
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                None,
                None,
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        let remaining = RemainingPeripherals {
            flash: p.FLASH,
            flash_dma: p.DMA_CH0,
            adc: p.ADC,
            axis1: p.PIN_26,
            axis2: p.PIN_27,
        };
        (bank, remaining)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if AXIS_PINS.contains(&pin_num) {
            return Err(PinError::Reserved(pin_num));
        }
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Claim a configured output, parked at its inactive level
    pub fn output(&mut self, pin: PinConfig) -> Result<Output<'static>, PinError> {
        let gpio = self.take(pin.pin)?;
        Ok(Output::new(gpio, Level::from(pin.inverted)))
    }

    /// Claim a configured input with the requested pull
    pub fn input(&mut self, pin: PinConfig) -> Result<Input<'static>, PinError> {
        let gpio = self.take(pin.pin)?;
        let pull = if pin.pull_up { Pull::Up } else { Pull::None };
        Ok(Input::new(gpio, pull))
    }
}

/// Non-bank peripherals the firmware needs
pub struct RemainingPeripherals {
    pub flash: Peri<'static, FLASH>,
    pub flash_dma: Peri<'static, DMA_CH0>,
    pub adc: Peri<'static, ADC>,
    pub axis1: Peri<'static, PIN_26>,
    pub axis2: Peri<'static, PIN_27>,
}
