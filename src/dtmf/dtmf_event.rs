/// Notification about a received telephone event.
///
/// The first notification for an event has neither flag set; subsequent
/// packets of the same event are updates, and the E-bit packet is the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtmfEvent {
    pub digit: char,
    /// RTP timestamp of the event onset.
    pub timestamp: u32,
    pub duration_ms: u32,
    pub is_update: bool,
    pub is_end: bool,
}

impl DtmfEvent {
    pub fn is_onset(&self) -> bool {
        !self.is_update && !self.is_end
    }
}

/// Receives DTMF notifications. While attached, finalized digits are
/// delivered here instead of the digit queue.
///
/// Called from the receive path with no stream lock held.
pub trait DtmfObserver: Send + Sync {
    fn on_event(&self, event: &DtmfEvent);
}
