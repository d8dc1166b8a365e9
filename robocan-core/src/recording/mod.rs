//! Motion recording
//!
//! Turns live direction commands and step counts into a bounded sequence
//! of timed segments.

pub mod counter;
pub mod recorder;
pub mod segment;
pub mod sequence;

pub use counter::StepCounters;
pub use recorder::{Recorder, RecorderState, SegmentOutcome};
pub use segment::Segment;
pub use sequence::{AppendError, Sequence, MAX_SEGMENTS};
