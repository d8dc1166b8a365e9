//! Main controller task
//!
//! Owns the step driver, operator input and flash store and runs the
//! control loop forever. Playback runs inside this task, so it is the only
//! task that touches the step lines.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_time::Delay;

use robocan_core::control::Controller;
use robocan_drivers::input::PinInputSource;
use robocan_drivers::stepper::Tb6600Pair;
use robocan_hal_rp2040::adc::AdcAxis;
use robocan_hal_rp2040::flash::Rp2040FlashStorage;

use crate::platform::{DefmtSink, EmbassyClock};

/// Two TB6600 channels with busy-wait pulse timing
pub type StepDriver = Tb6600Pair<Output<'static>, Delay>;

/// Joystick on the ADC, buttons on GPIO
pub type OperatorInput = PinInputSource<AdcAxis<'static>, Input<'static>>;

/// The controller as wired on the board
pub type RobocanController =
    Controller<StepDriver, EmbassyClock, Rp2040FlashStorage<'static>, OperatorInput, DefmtSink>;

/// Controller task - boot, then loop
#[embassy_executor::task]
pub async fn controller_task(mut controller: RobocanController) {
    info!("Controller task started");

    controller.boot().await;
    info!(
        "Boot complete, {} segments in memory",
        controller.session().sequence.len()
    );

    controller.run().await;
}
