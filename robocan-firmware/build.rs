//! Build script for robocan-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections the firmware parser understands
const SECTIONS: [&str; 7] = [
    "driver", "playback", "input", "control", "channel1", "channel2", "buttons",
];

/// GPIOs wired to the joystick ADC
const AXIS_PINS: [u64; 2] = [26, 27];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(
            "machine.toml could not be read",
            &[format!("{} (create it in the robocan-firmware directory)", e)],
        ),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in machine.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_input(&config, &mut errors);
    validate_pins(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid machine.toml", &errors);
    }

    println!("cargo:warning=machine.toml validated successfully");
}

/// Abort the build with a boxed error list
fn fail(title: &str, errors: &[String]) -> ! {
    let lines = errors
        .iter()
        .map(|e| {
            let e = if e.len() > 62 {
                format!("{}...", &e[..59])
            } else {
                e.clone()
            };
            format!("║  • {:<62} ║", e)
        })
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, lines
    );
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_input(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(input) = config.get("input") else {
        return;
    };
    let forward = input
        .get("forward_permille")
        .and_then(toml::Value::as_integer)
        .unwrap_or(600);
    let reverse = input
        .get("reverse_permille")
        .and_then(toml::Value::as_integer)
        .unwrap_or(400);

    if !(0..=1000).contains(&forward) || !(0..=1000).contains(&reverse) {
        errors.push("[input] thresholds must be 0-1000".to_string());
    } else if reverse >= forward {
        errors.push("[input] reverse_permille must be below forward_permille".to_string());
    }

    if let Some(mapping) = input.get("mapping").and_then(toml::Value::as_str) {
        if !["independent", "differential"].contains(&mapping) {
            errors.push("[input] mapping must be 'independent' or 'differential'".to_string());
        }
    }
}

/// Check every pin string and reject duplicates
fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let mut used: Vec<(u64, String)> = Vec::new();

    for section in ["channel1", "channel2", "buttons"] {
        let Some(table) = config.get(section).and_then(toml::Value::as_table) else {
            continue;
        };
        for (key, value) in table {
            let Some(text) = value.as_str() else {
                errors.push(format!("[{}] {} must be a pin string", section, key));
                continue;
            };
            if section == "buttons" && text == "none" {
                continue;
            }
            let Some(pin) = pin_number(text) else {
                errors.push(format!("[{}] {} = '{}' is not a pin", section, key, text));
                continue;
            };

            let label = format!("[{}] {}", section, key);
            if pin > 29 {
                errors.push(format!("{} uses gpio{} (0-29 valid)", label, pin));
            } else if AXIS_PINS.contains(&pin) {
                errors.push(format!("{} uses joystick pin gpio{}", label, pin));
            } else if let Some((_, other)) = used.iter().find(|(p, _)| *p == pin) {
                errors.push(format!("{} reuses gpio{} from {}", label, pin, other));
            } else {
                used.push((pin, label));
            }
        }
    }
}

/// Pin number of a string like "^!gpio10"
fn pin_number(text: &str) -> Option<u64> {
    text.trim_start_matches(['!', '^'])
        .strip_prefix("gpio")?
        .parse()
        .ok()
}
