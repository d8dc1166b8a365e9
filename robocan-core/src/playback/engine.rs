//! Playback engine
//!
//! For every segment the engine sets both channel directions, then emits
//! `max(pulses1, pulses2)` ticks spaced `duration_ms * 1000 / max` µs apart.
//! Channel `i` steps on ticks `0..pulses_i`, so the channel with fewer
//! pulses finishes early in the segment and idles for the rest of it.
//! Segments without pulses are replayed as a plain wait.

use crate::recording::Sequence;
use crate::traits::{Channel, ChannelDriver, Clock};

use super::cursor::PlaybackCursor;

/// Default pause between consecutive segments
pub const DEFAULT_SEGMENT_GAP_MS: u32 = 50;

/// Cancellation check polled by the engine
///
/// Implemented for any `FnMut() -> bool`, so a closure reading the abort
/// button is enough.
pub trait AbortProbe {
    /// True if playback should stop now
    fn should_abort(&mut self) -> bool;
}

impl<F: FnMut() -> bool> AbortProbe for F {
    fn should_abort(&mut self) -> bool {
        self()
    }
}

/// Result of one playback call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackOutcome {
    /// The sequence was empty; the driver was not touched
    NothingToPlay,
    /// Every segment was replayed
    Completed {
        /// Number of segments replayed
        segments: usize,
    },
    /// The abort probe fired
    Aborted {
        /// Index of the segment being replayed
        segment: usize,
        /// Tick within that segment at which playback stopped
        tick: u32,
    },
}

/// Stateless sequence player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackEngine {
    /// Pause after every segment in milliseconds
    pub segment_gap_ms: u32,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_GAP_MS)
    }
}

impl PlaybackEngine {
    /// Create an engine with the given inter-segment gap
    pub const fn new(segment_gap_ms: u32) -> Self {
        Self { segment_gap_ms }
    }

    /// Replay `sequence`, last segment first if `reverse`
    ///
    /// The abort probe is checked before every tick and before every dwell.
    /// Both channels are disabled when playback completes or aborts.
    pub async fn play<const N: usize, D, C, A>(
        &self,
        sequence: &Sequence<N>,
        reverse: bool,
        driver: &mut D,
        clock: &C,
        abort: &mut A,
    ) -> PlaybackOutcome
    where
        D: ChannelDriver,
        C: Clock,
        A: AbortProbe,
    {
        if sequence.is_empty() {
            return PlaybackOutcome::NothingToPlay;
        }

        let mut cursor = PlaybackCursor::new(sequence.len(), reverse);
        let mut played = 0;
        let mut stopped_at = None;

        while let Some(index) = cursor.next() {
            let Some(segment) = sequence.get(index) else {
                break;
            };

            for channel in Channel::ALL {
                driver.apply(channel, segment.direction(channel));
            }

            match segment.tick_period_us() {
                None => {
                    if abort.should_abort() {
                        stopped_at = Some((index, 0));
                        cursor.stop();
                        break;
                    }
                    clock.delay_ms(segment.duration_ms as u64).await;
                }
                Some(period_us) => {
                    for tick in 0..segment.max_pulses() {
                        if abort.should_abort() {
                            stopped_at = Some((index, tick));
                            cursor.stop();
                            break;
                        }

                        let started = clock.now_us();
                        driver.pulse_pair(tick < segment.pulses1, tick < segment.pulses2);
                        let spent = clock.now_us().saturating_sub(started);
                        if period_us > spent {
                            clock.delay_us(period_us - spent).await;
                        }
                    }
                    if stopped_at.is_some() {
                        break;
                    }
                }
            }

            clock.delay_ms(self.segment_gap_ms as u64).await;
            played += 1;
        }

        driver.disable_all();

        match stopped_at {
            Some((segment, tick)) => PlaybackOutcome::Aborted { segment, tick },
            None => PlaybackOutcome::Completed { segments: played },
        }
    }
}
