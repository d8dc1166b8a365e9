//! Sequence persistence
//!
//! Serializes a recording into a single blob and stores it through the
//! [`robocan_hal::FlashStorage`] trait.

pub mod codec;
pub mod store;

pub use codec::{decode, encode, Corruption, MAX_BLOB_SIZE};
pub use store::{LoadReport, SequenceStore, StoreError};
