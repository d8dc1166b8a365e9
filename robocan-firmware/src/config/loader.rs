//! Configuration persistence
//!
//! A TOML document stored under [`StorageKey::MachineConfigToml`] overrides
//! the embedded default. A stored document that fails to read, parse or
//! validate is reported and skipped.

use core::str;
use defmt::*;

use robocan_core::config::{parse_config, MachineConfig, ParseError, ValidationError};
use robocan_core::storage::MAX_BLOB_SIZE;
use robocan_hal_rp2040::flash::{FlashError, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use robocan_hal_rp2040::FlashStorageTrait;

/// Embedded default configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../machine.toml");

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    Parse(ParseError),
    /// Parsed but inconsistent
    Invalid(ValidationError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        ConfigError::Invalid(e)
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigSource {
    Flash,
    Embedded,
    /// Built-in defaults; the embedded document was rejected
    Fallback,
}

/// Load the machine configuration
///
/// Tries flash first, then the embedded document, then built-in defaults.
pub async fn load_config<S: FlashStorageTrait>(storage: &mut S) -> (MachineConfig, ConfigSource) {
    match load_stored(storage).await {
        Ok(config) => {
            info!("Loaded configuration from flash");
            log_config_summary(&config);
            return (config, ConfigSource::Flash);
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            debug!("No configuration in flash");
        }
        Err(e) => {
            warn!("Stored configuration rejected: {:?}", e);
        }
    }

    match parse_checked(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Using embedded configuration");
            log_config_summary(&config);
            (config, ConfigSource::Embedded)
        }
        Err(e) => {
            // Only reachable if build-time validation was bypassed
            error!("Embedded configuration rejected: {:?}", e);
            (MachineConfig::default(), ConfigSource::Fallback)
        }
    }
}

async fn load_stored<S: FlashStorageTrait>(storage: &mut S) -> Result<MachineConfig, ConfigError> {
    let mut buffer = [0u8; MAX_BLOB_SIZE];
    let len = storage
        .read(StorageKey::MachineConfigToml, &mut buffer)
        .await?;

    debug!("Read {} bytes of TOML from flash", len);

    let text = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;
    parse_checked(text)
}

fn parse_checked(text: &str) -> Result<MachineConfig, ConfigError> {
    let config = parse_config(text)?;
    config.validate()?;
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &MachineConfig) {
    debug!(
        "  pulse {} us, gap {} ms, mapping {:?}",
        config.driver.pulse_width_us, config.playback.segment_gap_ms, config.input.mapping
    );
    for (i, channel) in config.channels.iter().enumerate() {
        debug!(
            "  channel{}: step gpio{} dir gpio{} enable gpio{}",
            i + 1,
            channel.step_pin.pin,
            channel.dir_pin.pin,
            channel.enable_pin.pin
        );
    }
}
