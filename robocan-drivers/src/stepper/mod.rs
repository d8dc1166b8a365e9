//! Stepper driver implementations

pub mod tb6600;

pub use tb6600::{from_config, StepChannel, Tb6600Pair};
