//! Host-side test doubles

use core::cell::Cell;
use std::collections::{BTreeMap, VecDeque};

use robocan_hal::{FlashError, FlashStorage, StorageKey};

use crate::control::{ControlEvent, EventSink};
use crate::input::InputSample;
use crate::traits::{Channel, ChannelDriver, Clock, InputSource};

/// Simulated monotonic clock; delays advance time instantly
#[derive(Debug, Default)]
pub struct SimClock {
    now_us: Cell<u64>,
    slept_us: Cell<u64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_us(&self, us: u64) {
        self.now_us.set(self.now_us.get() + us);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1_000);
    }

    /// Total time spent in `delay_us`
    pub fn slept_us(&self) -> u64 {
        self.slept_us.get()
    }
}

impl Clock for SimClock {
    fn now_us(&self) -> u64 {
        self.now_us.get()
    }

    async fn delay_us(&self, us: u64) {
        self.slept_us.set(self.slept_us.get() + us);
        self.advance_us(us);
    }
}

/// Something the driver was told to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    Direction(Channel, bool),
    Enable(Channel, bool),
    Pulse(Channel),
}

/// Channel driver that records every call with its timestamp
///
/// Each pulse costs `pulse_us` of simulated time.
#[derive(Debug)]
pub struct MockDriver<'a> {
    clock: &'a SimClock,
    pulse_us: u64,
    enabled: [bool; 2],
    pub events: Vec<(u64, DriverEvent)>,
}

impl<'a> MockDriver<'a> {
    pub fn new(clock: &'a SimClock) -> Self {
        Self::with_pulse_us(clock, 10)
    }

    pub fn with_pulse_us(clock: &'a SimClock, pulse_us: u64) -> Self {
        Self {
            clock,
            pulse_us,
            enabled: [false; 2],
            events: Vec::new(),
        }
    }

    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.enabled[channel.index()]
    }

    pub fn pulse_times(&self, channel: Channel) -> Vec<u64> {
        self.events
            .iter()
            .filter(|(_, e)| *e == DriverEvent::Pulse(channel))
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn pulse_count(&self, channel: Channel) -> usize {
        self.pulse_times(channel).len()
    }

    fn record(&mut self, event: DriverEvent) {
        self.events.push((self.clock.now_us(), event));
    }
}

impl ChannelDriver for MockDriver<'_> {
    fn set_direction(&mut self, channel: Channel, forward: bool) {
        self.record(DriverEvent::Direction(channel, forward));
    }

    fn set_enabled(&mut self, channel: Channel, enabled: bool) {
        self.enabled[channel.index()] = enabled;
        self.record(DriverEvent::Enable(channel, enabled));
    }

    fn pulse(&mut self, channel: Channel) {
        self.record(DriverEvent::Pulse(channel));
        self.clock.advance_us(self.pulse_us);
    }
}

/// In-memory flash with injectable I/O failure
#[derive(Debug, Default)]
pub struct MemFlash {
    pub blobs: BTreeMap<u8, Vec<u8>>,
    pub fail: bool,
}

impl MemFlash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: StorageKey, data: &[u8]) {
        self.blobs.insert(key.as_u8(), data.to_vec());
    }

    pub fn get(&self, key: StorageKey) -> Option<&[u8]> {
        self.blobs.get(&key.as_u8()).map(Vec::as_slice)
    }
}

impl FlashStorage for MemFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if self.fail {
            return Err(FlashError::Flash);
        }
        let data = self.blobs.get(&key.as_u8()).ok_or(FlashError::NotFound)?;
        let dest = buffer
            .get_mut(..data.len())
            .ok_or(FlashError::BufferTooSmall)?;
        dest.copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail {
            return Err(FlashError::Flash);
        }
        self.put(key, data);
        Ok(())
    }

    async fn remove(&mut self, key: StorageKey) -> Result<(), FlashError> {
        if self.fail {
            return Err(FlashError::Flash);
        }
        self.blobs.remove(&key.as_u8());
        Ok(())
    }
}

/// Input source replaying queued samples, then holding the last one
#[derive(Debug, Default)]
pub struct ScriptedInput {
    queue: VecDeque<InputSample>,
    last: InputSample,
    /// Abort level reported between samples (during playback)
    pub abort_after: Option<u32>,
    abort_polls: u32,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: InputSample) {
        self.queue.push_back(sample);
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputSample {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }

    fn abort_pressed(&mut self) -> bool {
        self.abort_polls += 1;
        match self.abort_after {
            Some(n) => self.abort_polls > n,
            None => self.last.buttons.abort,
        }
    }
}

/// Event sink that keeps everything it is given
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<ControlEvent>,
    pub screens: Vec<String>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_screen(&self) -> Option<&str> {
        self.screens.last().map(String::as_str)
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    fn status(&mut self, text: &str) {
        self.screens.push(text.into());
    }
}
