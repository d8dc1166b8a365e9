//! Machine configuration
//!
//! Board-agnostic configuration structures and the text parser that fills
//! them from `machine.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
