//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in robocan-core on top of `embedded-hal` pins:
//!
//! - Step/dir/enable channel pairs (TB6600 and compatible)
//! - Operator input from analog axes and push buttons

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod input;
pub mod stepper;

#[cfg(test)]
pub(crate) mod testing;
