//! Operator status text

use core::fmt::Write;

use heapless::String;

use super::session::{Mode, Session};

/// Maximum rendered status length
pub const MAX_STATUS_LEN: usize = 48;

/// What the status display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusView {
    /// Mode flags and segment count
    Normal {
        recording: bool,
        playing: bool,
        segments: usize,
    },
    /// Waiting for the second delete press
    ConfirmDelete,
    /// Shown for a while after a delete
    Deleted,
}

impl StatusView {
    /// Current view of a session
    pub fn of<const N: usize>(session: &Session<N>, now_ms: u64) -> Self {
        if session.notice_active(now_ms) {
            StatusView::Deleted
        } else if session.delete_pending() {
            StatusView::ConfirmDelete
        } else {
            StatusView::Normal {
                recording: session.mode() == Mode::Recording,
                playing: session.mode() == Mode::Playing,
                segments: session.sequence.len(),
            }
        }
    }

    /// Two-line text form
    pub fn render(&self) -> String<MAX_STATUS_LEN> {
        let mut text = String::new();
        // Longest text is well below MAX_STATUS_LEN
        let _ = match *self {
            StatusView::Normal {
                recording,
                playing,
                segments,
            } => write!(
                text,
                "REC:{}  PLAY:{}\nSegs: {}",
                on_off(recording),
                on_off(playing),
                segments
            ),
            StatusView::ConfirmDelete => text.write_str("Press delete again\nto confirm DELETE"),
            StatusView::Deleted => text.write_str("DELETED ALL"),
        };
        text
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}
