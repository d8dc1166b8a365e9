//! Configuration loading
//!
//! Loads configuration from flash or the embedded `machine.toml`.
//! Parsing and validation live in `robocan_core::config`.

pub mod loader;

pub use loader::{load_config, ConfigSource};
