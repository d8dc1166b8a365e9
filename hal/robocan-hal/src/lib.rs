//! Robocan Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the board-agnostic crates
//! consume but do not implement. Chip-specific HALs (RP2040 today) provide
//! the implementations, so the recorder and playback logic can be tested
//! on the host against in-memory fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (robocan-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  robocan-core / robocan-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  robocan-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ robocan-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key-value storage
//! - [`adc::AnalogInput`] - Raw joystick axis readings
//!
//! Digital pins go through `embedded-hal` directly.

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;

// Re-export key traits at crate root for convenience
pub use adc::AnalogInput;
pub use flash::{FlashError, FlashStorage, StorageKey};
