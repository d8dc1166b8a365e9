//! Board glue for the core traits
//!
//! - [`EmbassyClock`]: `Clock` on top of `embassy-time`
//! - [`DefmtSink`]: control events and status text to the defmt log

use defmt::*;
use embassy_time::{Instant, Timer};

use robocan_core::control::{ControlEvent, EventSink};
use robocan_core::traits::Clock;

/// Monotonic clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }

    async fn delay_us(&self, us: u64) {
        Timer::after_micros(us).await;
    }
}

/// Event sink that logs over defmt
///
/// There is no display on the board; the status text goes to the log.
#[derive(Debug, Default)]
pub struct DefmtSink;

impl EventSink for DefmtSink {
    fn emit(&mut self, event: ControlEvent) {
        if event.is_error() {
            warn!("{:?}", event);
        } else {
            info!("{:?}", event);
        }
    }

    fn status(&mut self, text: &str) {
        for line in text.lines() {
            info!("| {=str}", line);
        }
    }
}
