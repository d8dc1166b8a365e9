//! TB6600 step/dir/enable channel pair
//!
//! The TB6600 (and the A4988/DRV8825 family) takes three logic lines per
//! motor:
//! - STEP: one rising edge per step, held for at least a few microseconds
//! - DIR: direction, sampled on the step edge
//! - ENA: output stage enable
//!
//! Optocoupled TB6600 boards are usually wired common-anode, which makes ENA
//! active-low. Each line carries its own polarity from [`PinConfig`].
//!
//! # Pulse timing
//!
//! A pulse holds STEP active for `pulse_width_us`, then inactive for the same
//! time before returning, so back-to-back pulses never merge. Both channels
//! can be pulsed together; their step lines then rise and fall together.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use robocan_core::config::{ChannelPins, PinConfig};
use robocan_core::traits::{Channel, ChannelDriver};

/// The three output lines of one channel
pub struct StepChannel<P> {
    step: P,
    dir: P,
    enable: P,
    step_inverted: bool,
    dir_inverted: bool,
    enable_inverted: bool,
}

impl<P: OutputPin> StepChannel<P> {
    /// Wrap the pins of one channel with the polarity from `pins`
    ///
    /// The channel starts disabled with STEP and DIR inactive.
    pub fn new(step: P, dir: P, enable: P, pins: &ChannelPins) -> Self {
        let mut channel = Self {
            step,
            dir,
            enable,
            step_inverted: pins.step_pin.inverted,
            dir_inverted: pins.dir_pin.inverted,
            enable_inverted: pins.enable_pin.inverted,
        };
        channel.set_step(false);
        channel.set_dir(false);
        channel.set_enable(false);
        channel
    }

    fn set_step(&mut self, active: bool) {
        drive(&mut self.step, active, self.step_inverted);
    }

    fn set_dir(&mut self, forward: bool) {
        drive(&mut self.dir, forward, self.dir_inverted);
    }

    fn set_enable(&mut self, enabled: bool) {
        drive(&mut self.enable, enabled, self.enable_inverted);
    }
}

/// Write a logical level to a line, honouring its polarity
///
/// GPIO writes on the supported boards cannot fail; an error is dropped
/// rather than aborting a pulse train halfway.
fn drive<P: OutputPin>(pin: &mut P, active: bool, inverted: bool) {
    let _ = pin.set_state(PinState::from(active != inverted));
}

/// Two TB6600 channels sharing one blocking delay
pub struct Tb6600Pair<P, D> {
    channels: [StepChannel<P>; 2],
    delay: D,
    pulse_width_us: u32,
}

impl<P: OutputPin, D: DelayNs> Tb6600Pair<P, D> {
    /// Create a pair from two prepared channels
    ///
    /// `pulse_width_us` is the STEP active time and the recovery time after
    /// it. Zero is rejected by config validation; it is clamped to 1 here.
    pub fn new(
        first: StepChannel<P>,
        second: StepChannel<P>,
        delay: D,
        pulse_width_us: u32,
    ) -> Self {
        Self {
            channels: [first, second],
            delay,
            pulse_width_us: pulse_width_us.max(1),
        }
    }

    fn channel(&mut self, channel: Channel) -> &mut StepChannel<P> {
        &mut self.channels[channel.index()]
    }

    fn hold(&mut self) {
        self.delay.delay_us(self.pulse_width_us);
    }
}

/// Build a channel pair straight from config pins
///
/// `make` claims the output for one configured pin; the board crate
/// supplies it. The first error stops construction.
pub fn from_config<P, D, E, F>(
    pins: &[ChannelPins; 2],
    delay: D,
    pulse_width_us: u32,
    mut make: F,
) -> Result<Tb6600Pair<P, D>, E>
where
    P: OutputPin,
    D: DelayNs,
    F: FnMut(PinConfig) -> Result<P, E>,
{
    let first = channel_from(&pins[0], &mut make)?;
    let second = channel_from(&pins[1], &mut make)?;
    Ok(Tb6600Pair::new(first, second, delay, pulse_width_us))
}

fn channel_from<P, E, F>(lines: &ChannelPins, make: &mut F) -> Result<StepChannel<P>, E>
where
    P: OutputPin,
    F: FnMut(PinConfig) -> Result<P, E>,
{
    Ok(StepChannel::new(
        make(lines.step_pin)?,
        make(lines.dir_pin)?,
        make(lines.enable_pin)?,
        lines,
    ))
}

impl<P: OutputPin, D: DelayNs> ChannelDriver for Tb6600Pair<P, D> {
    fn set_direction(&mut self, channel: Channel, forward: bool) {
        self.channel(channel).set_dir(forward);
    }

    fn set_enabled(&mut self, channel: Channel, enabled: bool) {
        self.channel(channel).set_enable(enabled);
    }

    fn pulse(&mut self, channel: Channel) {
        self.channel(channel).set_step(true);
        self.hold();
        self.channel(channel).set_step(false);
        self.hold();
    }

    fn pulse_pair(&mut self, first: bool, second: bool) {
        if !first && !second {
            return;
        }
        let selected = [first, second];

        for (channel, _) in self.channels.iter_mut().zip(selected).filter(|(_, on)| *on) {
            channel.set_step(true);
        }
        self.hold();
        for (channel, _) in self.channels.iter_mut().zip(selected).filter(|(_, on)| *on) {
            channel.set_step(false);
        }
        self.hold();
    }
}
