//! Joystick axes on the RP2040 ADC
//!
//! Both axes share the single ADC block. Reads are blocking (a conversion
//! takes about 2 µs), so they can be polled between playback ticks.

use core::cell::RefCell;

use embassy_rp::adc::{Adc, Blocking, Channel, Config};
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::{ADC, PIN_26, PIN_27};
use embassy_rp::Peri;
use robocan_hal::AnalogInput;

/// ADC block shared by the axis channels
pub type SharedAdc = RefCell<Adc<'static, Blocking>>;

/// Full-scale reading of the 12-bit converter
pub const ADC_FULL_SCALE: u16 = 4095;

/// Create the shared ADC in blocking mode
pub fn shared_adc(adc: Peri<'static, ADC>) -> SharedAdc {
    RefCell::new(Adc::new_blocking(adc, Config::default()))
}

/// One joystick axis
pub struct AdcAxis<'a> {
    adc: &'a SharedAdc,
    channel: Channel<'static>,
}

impl<'a> AdcAxis<'a> {
    pub fn new(adc: &'a SharedAdc, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

/// Both axes on their fixed pins (axis 1 on GPIO26, axis 2 on GPIO27)
pub fn joystick_axes<'a>(
    adc: &'a SharedAdc,
    axis1: Peri<'static, PIN_26>,
    axis2: Peri<'static, PIN_27>,
) -> [AdcAxis<'a>; 2] {
    [
        AdcAxis::new(adc, Channel::new_pin(axis1, Pull::None)),
        AdcAxis::new(adc, Channel::new_pin(axis2, Pull::None)),
    ]
}

impl AnalogInput for AdcAxis<'_> {
    fn read_raw(&mut self) -> Option<u16> {
        // Only one reader at a time; a nested borrow reads as a failed conversion
        let mut adc = self.adc.try_borrow_mut().ok()?;
        adc.blocking_read(&mut self.channel).ok()
    }
}
