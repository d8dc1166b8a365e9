//! Live segment recorder
//!
//! Watches direction commands while recording is armed. Every direction
//! change closes the open window: its elapsed time and the step counter
//! deltas since it opened become a candidate segment, which is appended to
//! the sequence unless both channels were stopped.

use super::counter::StepCounters;
use super::segment::Segment;
use super::sequence::{AppendError, Sequence};
use crate::traits::{Channel, Direction};

/// Recorder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecorderState {
    /// Not recording
    Idle,
    /// Recording with an open window
    Armed,
}

/// What happened to a finalized window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentOutcome {
    /// Appended to the sequence
    Appended(Segment),
    /// Both channels were stopped; the window only contributed time
    Stationary {
        /// Length of the discarded window
        duration_ms: u32,
    },
    /// Sequence full; the segment was computed and dropped
    Dropped(Segment),
}

/// Open recording window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    dir1: Direction,
    dir2: Direction,
    start_ms: u64,
    start_counts: [u32; 2],
}

impl Window {
    fn open(dir1: Direction, dir2: Direction, counters: &StepCounters, now_ms: u64) -> Self {
        Self {
            dir1,
            dir2,
            start_ms: now_ms,
            start_counts: counters.snapshot(),
        }
    }

    fn close(&self, counters: &StepCounters, now_ms: u64) -> Segment {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let delta = |ch: Channel| counters.get(ch).wrapping_sub(self.start_counts[ch.index()]);

        Segment::new(
            self.dir1,
            self.dir2,
            delta(Channel::One),
            delta(Channel::Two),
            u32::try_from(elapsed).unwrap_or(u32::MAX),
        )
    }
}

/// Segment recorder
///
/// Owns only the active window. The sequence and step counters are borrowed
/// per call from the session that owns them.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    window: Option<Window>,
}

impl Recorder {
    /// Create an idle recorder
    pub const fn new() -> Self {
        Self { window: None }
    }

    /// Current state
    pub fn state(&self) -> RecorderState {
        if self.window.is_some() {
            RecorderState::Armed
        } else {
            RecorderState::Idle
        }
    }

    /// True while recording
    pub fn is_armed(&self) -> bool {
        self.window.is_some()
    }

    /// Directions of the open window
    pub fn directions(&self) -> Option<(Direction, Direction)> {
        self.window.map(|w| (w.dir1, w.dir2))
    }

    /// Start recording
    ///
    /// Resets both step counters and opens a stationary window at `now_ms`.
    /// Restarting while armed discards the open window.
    pub fn start(&mut self, counters: &mut StepCounters, now_ms: u64) {
        counters.reset();
        self.window = Some(Window::open(
            Direction::Stop,
            Direction::Stop,
            counters,
            now_ms,
        ));
    }

    /// Stop recording, discarding the open window
    ///
    /// Segments already appended stay. Returns false if not armed.
    pub fn cancel(&mut self) -> bool {
        self.window.take().is_some()
    }

    /// Report the directions now in effect
    ///
    /// If they differ from the open window, the window is finalized and a new
    /// one opened with the new directions. Returns `None` when idle or when
    /// nothing changed.
    pub fn note_direction_change<const N: usize>(
        &mut self,
        dir1: Direction,
        dir2: Direction,
        sequence: &mut Sequence<N>,
        counters: &StepCounters,
        now_ms: u64,
    ) -> Option<SegmentOutcome> {
        let window = self.window?;
        if (window.dir1, window.dir2) == (dir1, dir2) {
            return None;
        }
        let outcome = Self::finalize(&window, sequence, counters, now_ms);
        self.window = Some(Window::open(dir1, dir2, counters, now_ms));
        Some(outcome)
    }

    /// Manually close the open window without a direction change
    ///
    /// A fresh window with the same directions is opened, so the operator
    /// can keep moving the same way as a new segment.
    pub fn close_current_segment<const N: usize>(
        &mut self,
        sequence: &mut Sequence<N>,
        counters: &StepCounters,
        now_ms: u64,
    ) -> Option<SegmentOutcome> {
        let window = self.window?;
        let outcome = Self::finalize(&window, sequence, counters, now_ms);
        self.window = Some(Window::open(window.dir1, window.dir2, counters, now_ms));
        Some(outcome)
    }

    fn finalize<const N: usize>(
        window: &Window,
        sequence: &mut Sequence<N>,
        counters: &StepCounters,
        now_ms: u64,
    ) -> SegmentOutcome {
        let segment = window.close(counters, now_ms);
        match sequence.append(segment) {
            Ok(()) => SegmentOutcome::Appended(segment),
            Err(AppendError::Full) => SegmentOutcome::Dropped(segment),
            // Window segments are consistent by construction, so the only
            // other rejection is a stationary window.
            Err(AppendError::Stationary | AppendError::Inconsistent) => {
                SegmentOutcome::Stationary {
                    duration_ms: segment.duration_ms,
                }
            }
        }
    }
}
