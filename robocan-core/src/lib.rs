//! Board-agnostic core logic for the Robocan motion recorder
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware capability traits (step channels, clock, operator input)
//! - Segment model, bounded sequence and the live segment recorder
//! - Playback engine that regenerates interleaved step pulses
//! - Sequence persistence on top of `robocan_hal::FlashStorage`
//! - Input mapping and button edge detection
//! - Control layer arbitrating recording, playback and storage
//! - Configuration types and the machine.toml parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod input;
pub mod playback;
pub mod recording;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
