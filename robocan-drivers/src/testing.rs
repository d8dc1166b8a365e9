//! Recording pin and delay fakes shared by the driver tests

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use robocan_hal::AnalogInput;

/// One observed line change or delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Level(&'static str, bool),
    DelayNs(u32),
}

/// Shared, ordered log of everything the fakes saw
#[derive(Clone, Default)]
pub struct Tracer(Rc<RefCell<Vec<Trace>>>);

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self, name: &'static str) -> MockOutput {
        MockOutput {
            name,
            tracer: self.clone(),
        }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay {
            tracer: self.clone(),
        }
    }

    pub fn take(&self) -> Vec<Trace> {
        self.0.take()
    }

    /// Last level written to a named line
    pub fn level(&self, name: &str) -> Option<bool> {
        self.0.borrow().iter().rev().find_map(|trace| match *trace {
            Trace::Level(n, level) if n == name => Some(level),
            _ => None,
        })
    }

    fn push(&self, trace: Trace) {
        self.0.borrow_mut().push(trace);
    }
}

pub struct MockOutput {
    name: &'static str,
    tracer: Tracer,
}

impl ErrorType for MockOutput {
    type Error = Infallible;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.tracer.push(Trace::Level(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.tracer.push(Trace::Level(self.name, true));
        Ok(())
    }
}

pub struct MockDelay {
    tracer: Tracer,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.tracer.push(Trace::DelayNs(ns));
    }
}

/// Input line whose level the test sets; counts reads
#[derive(Clone, Default)]
pub struct MockInput {
    high: Rc<Cell<bool>>,
    reads: Rc<Cell<u32>>,
}

impl MockInput {
    pub fn set_high(&self, high: bool) {
        self.high.set(high);
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.high.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Analog channel returning a settable reading
#[derive(Clone, Default)]
pub struct MockAxis {
    value: Rc<Cell<Option<u16>>>,
}

impl MockAxis {
    pub fn set(&self, value: Option<u16>) {
        self.value.set(value);
    }
}

impl AnalogInput for MockAxis {
    fn read_raw(&mut self) -> Option<u16> {
        self.value.get()
    }
}
