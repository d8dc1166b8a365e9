//! Operator input drivers

pub mod pins;

pub use pins::{ButtonLine, PinInputSource};
