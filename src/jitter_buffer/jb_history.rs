/// Prefetch adjustment decided at the end of a history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Adjust {
    Grow,
    Shrink,
}

/// Counts late and missing events over fixed windows of pulled frames.
#[derive(Debug, Clone)]
pub(crate) struct JbHistory {
    window_len: u32,
    grow_threshold: f64,
    shrink_threshold: f64,
    shrink_sustain: u32,

    pulls: u32,
    events: u32,
    quiet_windows: u32,
    last_rate: f64,
}

impl JbHistory {
    pub(crate) fn new(
        window_len: u32,
        grow_threshold: f64,
        shrink_threshold: f64,
        shrink_sustain: u32,
    ) -> Self {
        Self {
            window_len,
            grow_threshold,
            shrink_threshold,
            shrink_sustain: shrink_sustain.max(1),
            pulls: 0,
            events: 0,
            quiet_windows: 0,
            last_rate: 0.0,
        }
    }

    /// A late arrival counts against the window in progress.
    pub(crate) fn record_late(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    /// One pulled frame. Returns an adjustment when this pull closes a window.
    pub(crate) fn record_pull(&mut self, missing: bool) -> Option<Adjust> {
        self.pulls += 1;
        if missing {
            self.events = self.events.saturating_add(1);
        }
        if self.pulls < self.window_len {
            return None;
        }

        let rate = f64::from(self.events) / f64::from(self.pulls);
        self.last_rate = rate;
        self.pulls = 0;
        self.events = 0;

        if rate > self.grow_threshold {
            self.quiet_windows = 0;
            return Some(Adjust::Grow);
        }
        if rate < self.shrink_threshold {
            self.quiet_windows += 1;
            if self.quiet_windows >= self.shrink_sustain {
                self.quiet_windows = 0;
                return Some(Adjust::Shrink);
            }
        } else {
            self.quiet_windows = 0;
        }
        None
    }

    /// Event rate of the last completed window.
    pub(crate) fn last_rate(&self) -> f64 {
        self.last_rate
    }
}
