//! Playback iteration state

/// Position of one playback call within a sequence
///
/// Walks indices from the first segment to the last, or from the last to the
/// first in reverse, until the end is reached or the cursor is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackCursor {
    /// Next index to visit
    index: isize,
    /// +1 forward, -1 reverse
    step: isize,
    /// One past the last index to visit
    end: isize,
    /// Cleared by an abort
    live: bool,
}

impl PlaybackCursor {
    /// Create a cursor over `len` segments
    pub fn new(len: usize, reverse: bool) -> Self {
        let len = len as isize;
        if reverse {
            Self {
                index: len - 1,
                step: -1,
                end: -1,
                live: true,
            }
        } else {
            Self {
                index: 0,
                step: 1,
                end: len,
                live: true,
            }
        }
    }

    /// True while playback should continue
    pub fn is_live(&self) -> bool {
        self.live && self.index != self.end
    }

    /// Stop the cursor; no further indices are produced
    pub fn stop(&mut self) {
        self.live = false;
    }
}

impl Iterator for PlaybackCursor {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if !self.is_live() {
            return None;
        }
        let index = self.index as usize;
        self.index += self.step;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_order() {
        let cursor = PlaybackCursor::new(4, false);
        assert_eq!(cursor.collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reverse_order() {
        let cursor = PlaybackCursor::new(4, true);
        assert_eq!(cursor.collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_empty_is_not_live() {
        assert!(!PlaybackCursor::new(0, false).is_live());
        assert!(!PlaybackCursor::new(0, true).is_live());
        assert_eq!(PlaybackCursor::new(0, true).next(), None);
    }

    #[test]
    fn test_stop() {
        let mut cursor = PlaybackCursor::new(3, false);
        assert_eq!(cursor.next(), Some(0));
        cursor.stop();
        assert!(!cursor.is_live());
        assert_eq!(cursor.next(), None);
    }
}
