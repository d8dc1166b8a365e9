//! Sequence store
//!
//! Keeps the recording in one blob under [`StorageKey::Recording`]. Saving
//! replaces the blob in a single write, so a reader sees either the old or
//! the new recording.

use robocan_hal::{FlashError, FlashStorage, StorageKey};

use crate::recording::Sequence;

use super::codec::{self, Corruption, MAX_BLOB_SIZE};

/// Errors from store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying flash operation failed
    Flash(FlashError),
    /// Sequence could not be serialized
    Encode,
    /// Serialized sequence does not fit the blob buffer
    BufferTooSmall,
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

impl From<postcard::Error> for StoreError {
    fn from(e: postcard::Error) -> Self {
        match e {
            postcard::Error::SerializeBufferFull => StoreError::BufferTooSmall,
            _ => StoreError::Encode,
        }
    }
}

/// What a successful load found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadReport {
    /// Nothing stored, or a stored empty recording
    Empty,
    /// A recording of this many segments
    Loaded(usize),
    /// Stored data was rejected; the returned sequence is empty
    Corrupted(Corruption),
}

/// Persistence adapter between a [`Sequence`] and flash
pub struct SequenceStore<S> {
    storage: S,
}

impl<S: FlashStorage> SequenceStore<S> {
    /// Wrap a flash storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Access the backing storage (e.g. to read the config override)
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Release the backing storage
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Persist `sequence`, replacing any stored recording
    ///
    /// Returns the number of bytes written.
    pub async fn save<const N: usize>(&mut self, sequence: &Sequence<N>) -> Result<usize, StoreError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let blob = codec::encode(sequence, &mut buf)?;
        self.storage.write(StorageKey::Recording, blob).await?;
        Ok(blob.len())
    }

    /// Load the stored recording
    ///
    /// An absent or corrupted blob is not an error: the sequence comes back
    /// empty and the report says why. Only flash I/O failures are errors.
    pub async fn load<const N: usize>(&mut self) -> Result<(Sequence<N>, LoadReport), StoreError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let len = match self.storage.read(StorageKey::Recording, &mut buf).await {
            Ok(len) => len,
            Err(FlashError::NotFound) => return Ok((Sequence::new(), LoadReport::Empty)),
            Err(FlashError::BufferTooSmall) => {
                return Ok((Sequence::new(), LoadReport::Corrupted(Corruption::Oversized)))
            }
            Err(FlashError::Corrupted) => {
                return Ok((Sequence::new(), LoadReport::Corrupted(Corruption::Unreadable)))
            }
            Err(e) => return Err(e.into()),
        };

        match codec::decode(&buf[..len]) {
            Ok(sequence) if sequence.is_empty() => Ok((sequence, LoadReport::Empty)),
            Ok(sequence) => {
                let count = sequence.len();
                Ok((sequence, LoadReport::Loaded(count)))
            }
            Err(corruption) => Ok((Sequence::new(), LoadReport::Corrupted(corruption))),
        }
    }

    /// Erase the stored recording; a following load returns empty
    pub async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.storage.remove(StorageKey::Recording).await?;
        Ok(())
    }
}
