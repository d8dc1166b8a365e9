//! Robocan - Two-Channel Motion Record/Playback Firmware
//!
//! Drives two step/dir/enable channels live from a joystick, records the
//! motion as timed segments, keeps the recording in flash and plays it back
//! forward or in reverse. Pin assignment and timing come from
//! `machine.toml`.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use robocan_core::control::Controller;
use robocan_core::storage::SequenceStore;
use robocan_drivers::input::PinInputSource;
use robocan_drivers::stepper;
use robocan_hal_rp2040::adc::{joystick_axes, shared_adc, SharedAdc};
use robocan_hal_rp2040::flash::Rp2040FlashStorage;
use robocan_hal_rp2040::pins::PinBank;

use crate::platform::{DefmtSink, EmbassyClock};

mod config;
mod platform;
mod tasks;

// Both joystick axes borrow the ADC for the life of the controller task
static ADC: StaticCell<SharedAdc> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Robocan firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut bank, rest) = PinBank::from_peripherals(p);
    info!("Peripherals initialized");

    let mut flash = Rp2040FlashStorage::new(rest.flash, rest.flash_dma);
    let (config, source) = config::load_config(&mut flash).await;
    info!("Configuration source: {:?}", source);

    // Pins were checked by MachineConfig::validate, so claiming cannot
    // conflict unless the bank and the validator disagree
    let driver = unwrap!(stepper::from_config(
        &config.channels,
        Delay,
        config.driver.pulse_width_us,
        |pin| bank.output(pin),
    ));
    info!("Step channels initialized");

    let adc: &'static SharedAdc = ADC.init(shared_adc(rest.adc));
    let axes = joystick_axes(adc, rest.axis1, rest.axis2);
    let center = config.input.mapper().bands.center();
    let input = unwrap!(PinInputSource::from_config(
        axes,
        &config.buttons,
        center,
        |pin| bank.input(pin),
    ));
    info!("Joystick and buttons initialized");

    let controller = Controller::new(
        driver,
        EmbassyClock,
        SequenceStore::new(flash),
        input,
        DefmtSink,
        &config,
    );

    unwrap!(spawner.spawn(tasks::controller_task(controller)));
    info!("Controller spawned, firmware running");
}
