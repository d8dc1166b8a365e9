//! Session state owned by the control layer
//!
//! Everything that was loose global state in a sketch-style firmware lives
//! here: the sequence, step counters, recorder, current mode, button edge
//! history and the delete/notice deadlines.

use crate::input::ButtonEdges;
use crate::recording::{Recorder, Sequence, StepCounters, MAX_SEGMENTS};

/// Top-level operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Live drive only
    #[default]
    Idle,
    /// Live drive while the recorder is armed
    Recording,
    /// A playback call is running
    Playing,
}

/// Result of a delete press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeletePress {
    /// First press; confirmation pending until the deadline
    Armed,
    /// Second press inside the window
    Confirmed,
}

/// Mutable state of one controller
#[derive(Debug, Clone, Default)]
pub struct Session<const N: usize = MAX_SEGMENTS> {
    pub sequence: Sequence<N>,
    pub counters: StepCounters,
    pub recorder: Recorder,
    pub edges: ButtonEdges,
    mode: Mode,
    delete_deadline_ms: Option<u64>,
    notice_until_ms: Option<u64>,
}

impl<const N: usize> Session<N> {
    pub fn new() -> Self {
        Self {
            sequence: Sequence::new(),
            counters: StepCounters::new(),
            recorder: Recorder::new(),
            edges: ButtonEdges::new(),
            mode: Mode::Idle,
            delete_deadline_ms: None,
            notice_until_ms: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.mode == Mode::Recording
    }

    /// Clear the sequence and arm the recorder
    pub fn start_recording(&mut self, now_ms: u64) {
        self.sequence.clear();
        self.recorder.start(&mut self.counters, now_ms);
        self.delete_deadline_ms = None;
        self.mode = Mode::Recording;
    }

    /// Disarm the recorder, keeping appended segments
    pub fn stop_recording(&mut self) {
        self.recorder.cancel();
        self.mode = Mode::Idle;
    }

    /// Enter playback; only valid while idle
    #[must_use]
    pub fn begin_playback(&mut self) -> bool {
        if self.mode != Mode::Idle {
            return false;
        }
        self.delete_deadline_ms = None;
        self.mode = Mode::Playing;
        true
    }

    pub fn end_playback(&mut self) {
        if self.mode == Mode::Playing {
            self.mode = Mode::Idle;
        }
    }

    /// Register a delete press
    ///
    /// A press while a confirmation is pending (deadline not passed)
    /// confirms it; any other press arms a new one.
    pub fn press_delete(&mut self, now_ms: u64, window_ms: u32) -> DeletePress {
        match self.delete_deadline_ms {
            Some(deadline) if now_ms <= deadline => {
                self.delete_deadline_ms = None;
                DeletePress::Confirmed
            }
            _ => {
                self.delete_deadline_ms = Some(now_ms + window_ms as u64);
                DeletePress::Armed
            }
        }
    }

    /// Drop a pending delete whose deadline has passed
    ///
    /// Returns true if one expired.
    pub fn expire_delete(&mut self, now_ms: u64) -> bool {
        match self.delete_deadline_ms {
            Some(deadline) if now_ms > deadline => {
                self.delete_deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn delete_pending(&self) -> bool {
        self.delete_deadline_ms.is_some()
    }

    /// Show the "deleted" notice until `now_ms + duration_ms`
    pub fn show_notice(&mut self, now_ms: u64, duration_ms: u32) {
        self.notice_until_ms = Some(now_ms + duration_ms as u64);
    }

    pub fn notice_active(&self, now_ms: u64) -> bool {
        self.notice_until_ms.is_some_and(|until| now_ms < until)
    }
}
