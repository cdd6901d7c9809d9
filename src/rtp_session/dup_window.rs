/// Sliding bitmap of the last 64 sequence numbers at or below the highest
/// one seen. Bit `i` set means `highest - i` was received.
#[derive(Debug, Clone, Default)]
pub(crate) struct DupWindow {
    window: u64,
}

pub(crate) const DUP_WINDOW_SIZE: u32 = 64;

impl DupWindow {
    /// Start over with only the current highest sequence marked.
    pub(crate) fn reset(&mut self) {
        self.window = 1;
    }

    /// The highest sequence moved forward by `diff`.
    pub(crate) fn advance(&mut self, diff: u32) {
        if diff < DUP_WINDOW_SIZE {
            self.window <<= diff;
        } else {
            self.window = 0;
        }
        self.window |= 1;
    }

    /// Marks `highest - back` as seen. Returns `true` if it already was.
    /// Packets older than the window are never reported as duplicates.
    pub(crate) fn check_and_record(&mut self, back: u32) -> bool {
        if back >= DUP_WINDOW_SIZE {
            return false;
        }
        let bit = 1u64 << back;
        let seen = (self.window & bit) != 0;
        self.window |= bit;
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_repeats_inside_window_only() {
        let mut w = DupWindow::default();
        w.reset();
        assert!(w.check_and_record(0));
        w.advance(2); // highest = h+2; h now at back=2, h+1 missing
        assert!(!w.check_and_record(1));
        assert!(w.check_and_record(1));
        assert!(w.check_and_record(2));
        assert!(!w.check_and_record(64));
    }

    #[test]
    fn large_advance_clears_history() {
        let mut w = DupWindow::default();
        w.reset();
        w.advance(100);
        assert!(!w.check_and_record(5));
    }
}
