//! RP2040-specific HAL for the Robocan firmware
//!
//! This crate provides RP2040 implementations of the shared `robocan-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - Config-driven GPIO claiming by pin number
//! - Joystick axes on the ADC (implements `robocan_hal::AnalogInput`)
//! - Flash storage driver (implements `robocan_hal::FlashStorage`)

#![no_std]

pub mod adc;
pub mod flash;
pub mod pins;

// Re-export shared traits from robocan-hal for convenience
pub use robocan_hal::{AnalogInput, FlashStorage as FlashStorageTrait, StorageKey};
