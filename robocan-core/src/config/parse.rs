//! Minimal TOML parser for machine configuration
//!
//! Handles only the subset `machine.toml` uses. It does NOT support the
//! full TOML spec.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs (string, integer)
//! - Comments (`# ...`), whole-line or trailing
//!
//! Keys the parser does not know are ignored. Values not given keep their
//! defaults.

use crate::input::{AxisMapping, Button};

use super::types::{ChannelPins, MachineConfig, PinConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Driver,
    Playback,
    Input,
    Control,
    Channel(usize),
    Buttons,
}

/// Parse TOML text into a [`MachineConfig`]
///
/// The result is not validated; call [`MachineConfig::validate`] on it.
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = strip_comment(header)
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "driver" => Ok(Section::Driver),
        "playback" => Ok(Section::Playback),
        "input" => Ok(Section::Input),
        "control" => Ok(Section::Control),
        "channel1" | "channel.1" => Ok(Section::Channel(0)),
        "channel2" | "channel.2" => Ok(Section::Channel(1)),
        "buttons" => Ok(Section::Buttons),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Driver => {
            if key == "pulse_width_us" {
                config.driver.pulse_width_us = parse_int(value)?;
            }
        }
        Section::Playback => {
            if key == "segment_gap_ms" {
                config.playback.segment_gap_ms = parse_int(value)?;
            }
        }
        Section::Input => {
            let input = &mut config.input;
            match key {
                "full_scale" => input.full_scale = parse_int(value)?,
                "forward_permille" => input.forward_permille = parse_int(value)?,
                "reverse_permille" => input.reverse_permille = parse_int(value)?,
                "mapping" => input.mapping = parse_mapping(value)?,
                _ => {}
            }
        }
        Section::Control => {
            let control = &mut config.control;
            match key {
                "loop_interval_ms" => control.loop_interval_ms = parse_int(value)?,
                "delete_confirm_ms" => control.delete_confirm_ms = parse_int(value)?,
                "status_refresh_ms" => control.status_refresh_ms = parse_int(value)?,
                "notice_ms" => control.notice_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Channel(index) => {
            let pins: &mut ChannelPins = &mut config.channels[index];
            match key {
                "step_pin" => pins.step_pin = parse_pin(value)?,
                "dir_pin" => pins.dir_pin = parse_pin(value)?,
                "enable_pin" => pins.enable_pin = parse_pin(value)?,
                _ => {}
            }
        }
        Section::Buttons => {
            if let Some(button) = button_key(key) {
                *config.buttons.slot_mut(button) = parse_optional_pin(value)?;
            }
        }
    }
    Ok(())
}

fn button_key(key: &str) -> Option<Button> {
    match key {
        "record" => Some(Button::Record),
        "mark" => Some(Button::Mark),
        "play_forward" => Some(Button::PlayForward),
        "play_reverse" => Some(Button::PlayReverse),
        "abort" => Some(Button::Abort),
        "delete" => Some(Button::Delete),
        "save" => Some(Button::Save),
        "load" => Some(Button::Load),
        _ => None,
    }
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(value: &str) -> &str {
    match value.find('#') {
        Some(pos) if value[..pos].matches('"').count() % 2 == 0 => value[..pos].trim(),
        _ => value.trim(),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value);

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_mapping(value: &str) -> Result<AxisMapping, ParseError> {
    match parse_string(value) {
        "independent" => Ok(AxisMapping::Independent),
        "differential" => Ok(AxisMapping::Differential),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut pin = PinConfig::default();

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            pin.inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pin.pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    pin.pin = number.parse().map_err(|_| ParseError::InvalidPin)?;
    Ok(pin)
}

/// Parse a pin string, or `"none"` to leave the input unassigned
fn parse_optional_pin(value: &str) -> Result<Option<PinConfig>, ParseError> {
    match parse_string(value) {
        "none" | "" => Ok(None),
        _ => parse_pin(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Two TB6600 channels on a Pico
[driver]
pulse_width_us = 150

[playback]
segment_gap_ms = 40   # pause between segments

[input]
full_scale = 4095
forward_permille = 650
reverse_permille = 350
mapping = "independent"

[control]
delete_confirm_ms = 3000

[channel1]
step_pin = "gpio2"
dir_pin = "!gpio3"
enable_pin = "!gpio4"

[channel2]
step_pin = "gpio6"
dir_pin = "gpio7"
enable_pin = "gpio8"

[buttons]
record = "^!gpio10"
mark = "none"
"#;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin, PinConfig::new(11));

        let pin = parse_pin("!gpio12").unwrap();
        assert!(pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("\"^!gpio5\"").unwrap();
        assert_eq!(pin, PinConfig::button(5));

        assert_eq!(parse_pin("pin5"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.driver.pulse_width_us, 150);
        assert_eq!(config.playback.segment_gap_ms, 40);
        assert_eq!(config.input.forward_permille, 650);
        assert_eq!(config.input.reverse_permille, 350);
        assert_eq!(config.input.mapping, AxisMapping::Independent);
        assert_eq!(config.control.delete_confirm_ms, 3000);
        // Untouched keys keep defaults
        assert_eq!(config.control.loop_interval_ms, 5);

        assert!(config.channels[0].dir_pin.inverted);
        assert_eq!(config.channels[1].enable_pin, PinConfig::new(8));
        assert_eq!(config.buttons.record, Some(PinConfig::button(10)));
        assert_eq!(config.buttons.mark, None);
        assert_eq!(config.buttons.save, MachineConfig::default().buttons.save);

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), MachineConfig::default());
        assert_eq!(parse_config("# nothing\n\n").unwrap(), MachineConfig::default());
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_config("[motor]"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[driver"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("[driver]\npulse_width_us = fast"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[input]\nfull_scale = 70000"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[input]\nmapping = \"tank\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[control]\nnot a pair"), Err(ParseError::InvalidLine));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse_config("[driver]\nmicrosteps = 16\n[control]\nbeep = true").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn test_header_comment() {
        let config = parse_config("[playback] # timing\nsegment_gap_ms = 0").unwrap();
        assert_eq!(config.playback.segment_gap_ms, 0);
    }
}
