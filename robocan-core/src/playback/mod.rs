//! Sequence playback
//!
//! Replays a recorded sequence through a [`ChannelDriver`], spreading each
//! channel's pulse count evenly over the segment's recorded duration.
//!
//! [`ChannelDriver`]: crate::traits::ChannelDriver

pub mod cursor;
pub mod engine;

pub use cursor::PlaybackCursor;
pub use engine::{AbortProbe, PlaybackEngine, PlaybackOutcome};
