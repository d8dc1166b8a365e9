//! Bounded, ordered segment sequence

use heapless::Vec;

use super::segment::Segment;

/// Default maximum number of segments in a recording
pub const MAX_SEGMENTS: usize = 100;

/// Why a segment was not appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppendError {
    /// Both channels were stopped; stationary segments are never stored
    Stationary,
    /// A stopped channel carries pulses
    Inconsistent,
    /// The sequence already holds `N` segments
    Full,
}

/// Recording: an ordered list of at most `N` segments
///
/// Insertion order is forward playback order. A full sequence rejects
/// further appends and leaves existing entries untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence<const N: usize = MAX_SEGMENTS> {
    segments: Vec<Segment, N>,
}

impl<const N: usize> Sequence<N> {
    /// Create an empty sequence
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a sequence from a slice, validating every segment
    pub fn from_segments(segments: &[Segment]) -> Result<Self, AppendError> {
        let mut seq = Self::new();
        for seg in segments {
            seq.append(*seg)?;
        }
        Ok(seq)
    }

    /// Append a segment at the end
    ///
    /// Stationary or inconsistent segments are rejected, and so is any
    /// segment once the sequence is full. The sequence is unchanged on error.
    pub fn append(&mut self, segment: Segment) -> Result<(), AppendError> {
        if segment.is_stationary() {
            return Err(AppendError::Stationary);
        }
        if !segment.is_consistent() {
            return Err(AppendError::Inconsistent);
        }
        self.segments
            .push(segment)
            .map_err(|_| AppendError::Full)
    }

    /// Remove all segments
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Number of stored segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if no segments are stored
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True once `N` segments are stored
    pub fn is_full(&self) -> bool {
        self.segments.is_full()
    }

    /// Maximum number of segments
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Segment at `index`
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Iterate in forward playback order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Segment> {
        self.segments.iter()
    }

    /// All segments as a slice
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Sum of all recorded durations in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_ms as u64).sum()
    }
}
