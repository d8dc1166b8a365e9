//! Control events reported to the operator

use crate::input::Button;
use crate::playback::PlaybackOutcome;
use crate::recording::Segment;
use crate::storage::{LoadReport, StoreError};

/// Something the control layer did or refused to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// Recording armed; the sequence was cleared
    RecordingStarted,
    /// Recording stopped; `segments` were kept
    RecordingCancelled { segments: usize },
    /// A segment was appended at `index`
    SegmentRecorded { index: usize, segment: Segment },
    /// The sequence was full; the segment was dropped
    SegmentDropped(Segment),
    /// A window with both channels stopped ended
    StationarySkipped { duration_ms: u32 },
    /// Sequence written to flash
    Saved { segments: usize, bytes: usize },
    SaveFailed(StoreError),
    /// Sequence replaced from flash
    Loaded(LoadReport),
    /// Flash read failed; the sequence in memory is unchanged
    LoadFailed(StoreError),
    PlaybackStarted { reverse: bool, segments: usize },
    PlaybackFinished(PlaybackOutcome),
    /// First delete press; waiting for confirmation
    DeleteArmed,
    /// Confirmation window ran out
    DeleteExpired,
    /// Stored and in-memory recording erased
    Deleted,
    DeleteFailed(StoreError),
    /// Button ignored because recording is active
    Busy(Button),
}

impl ControlEvent {
    /// True for events reporting a failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ControlEvent::SaveFailed(_)
                | ControlEvent::LoadFailed(_)
                | ControlEvent::DeleteFailed(_)
                | ControlEvent::Loaded(LoadReport::Corrupted(_))
        )
    }
}

/// Receiver of control events and status text
///
/// The firmware logs both; tests collect them.
pub trait EventSink {
    /// Report an event
    fn emit(&mut self, event: ControlEvent);

    /// Show new status text (two lines separated by `\n`)
    fn status(&mut self, text: &str);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: ControlEvent) {
        (**self).emit(event)
    }

    fn status(&mut self, text: &str) {
        (**self).status(text)
    }
}
