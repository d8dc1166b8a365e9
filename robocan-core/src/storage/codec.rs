//! Persisted sequence format
//!
//! One contiguous postcard blob: the segment count as a `u16` varint,
//! followed by that many [`Segment`] records. Each record is two signed
//! direction bytes and three unsigned varints (`pulses1`, `pulses2`,
//! `duration_ms`).
//!
//! Only the announced records are stored, with no padding to capacity.

use crate::recording::{Segment, Sequence, MAX_SEGMENTS};

use super::store::StoreError;

/// Worst-case encoded size of one segment record
pub const MAX_RECORD_SIZE: usize = 2 + 3 * 5;

/// Worst-case encoded size of a sequence of `n` segments
pub const fn max_encoded_len(n: usize) -> usize {
    3 + n * MAX_RECORD_SIZE
}

/// Size of the scratch buffer used for save and load
pub const MAX_BLOB_SIZE: usize = 2048;

const _: () = assert!(max_encoded_len(MAX_SEGMENTS) <= MAX_BLOB_SIZE);

/// Why a stored blob was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Corruption {
    /// Stored count exceeds the sequence capacity
    CountOutOfRange(u16),
    /// Count prefix is not a `u16` varint
    InvalidCount,
    /// Blob ends before the announced records
    Truncated,
    /// Record at this index does not decode or breaks segment invariants
    InvalidRecord(usize),
    /// Blob does not fit the load buffer
    Oversized,
    /// Storage layer reported a checksum failure
    Unreadable,
}

/// Serialize a sequence into `buf`, returning the used prefix
pub fn encode<'a, const N: usize>(
    sequence: &Sequence<N>,
    buf: &'a mut [u8],
) -> Result<&'a [u8], StoreError> {
    let count = u16::try_from(sequence.len()).map_err(|_| StoreError::Encode)?;
    let mut used = postcard::to_slice(&count, buf)?.len();

    for segment in sequence.iter() {
        let rest = buf.get_mut(used..).ok_or(StoreError::BufferTooSmall)?;
        used += postcard::to_slice(segment, rest)?.len();
    }

    Ok(&buf[..used])
}

/// Deserialize a blob written by [`encode`]
///
/// Bytes after the last announced record are ignored.
pub fn decode<const N: usize>(bytes: &[u8]) -> Result<Sequence<N>, Corruption> {
    let (count, mut rest) = postcard::take_from_bytes::<u16>(bytes).map_err(|e| match e {
        postcard::Error::DeserializeUnexpectedEnd => Corruption::Truncated,
        _ => Corruption::InvalidCount,
    })?;
    if count as usize > N {
        return Err(Corruption::CountOutOfRange(count));
    }

    let mut sequence = Sequence::new();
    for index in 0..count as usize {
        let (segment, tail) =
            postcard::take_from_bytes::<Segment>(rest).map_err(|e| match e {
                postcard::Error::DeserializeUnexpectedEnd => Corruption::Truncated,
                _ => Corruption::InvalidRecord(index),
            })?;
        sequence
            .append(segment)
            .map_err(|_| Corruption::InvalidRecord(index))?;
        rest = tail;
    }

    Ok(sequence)
}
