#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Vacant, or released without ever being filled.
    Missing,
    Filled,
    /// Its sequence carried something other than audio (a telephone event).
    Skipped,
    /// Its frame was concealed already when the packet finally showed up.
    LateDropped,
}

/// One ring entry. Payload storage is allocated once and reused.
#[derive(Debug, Clone)]
pub(crate) struct JbSlot {
    pub(crate) seq: u16,
    pub(crate) timestamp: u32,
    pub(crate) state: SlotState,
    /// Released as a missing frame, i.e. the decoder concealed `seq`.
    pub(crate) concealed: bool,
    len: usize,
    payload: Box<[u8]>,
}

impl JbSlot {
    pub(crate) fn new(max_frame_size: usize) -> Self {
        Self {
            seq: 0,
            timestamp: 0,
            state: SlotState::Missing,
            concealed: false,
            len: 0,
            payload: vec![0; max_frame_size].into_boxed_slice(),
        }
    }

    /// Caller checks the payload fits.
    pub(crate) fn fill(&mut self, seq: u16, timestamp: u32, payload: &[u8]) {
        self.payload[..payload.len()].copy_from_slice(payload);
        self.len = payload.len();
        self.seq = seq;
        self.timestamp = timestamp;
        self.state = SlotState::Filled;
        self.concealed = false;
    }

    pub(crate) fn skip(&mut self, seq: u16, timestamp: u32) {
        self.len = 0;
        self.seq = seq;
        self.timestamp = timestamp;
        self.state = SlotState::Skipped;
        self.concealed = false;
    }

    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self.state, SlotState::Filled | SlotState::Skipped)
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }

    pub(crate) fn capacity(&self) -> usize {
        self.payload.len()
    }

    /// Marks the slot vacant but remembers which sequence it last stood for.
    pub(crate) fn release(&mut self, seq: u16) {
        self.concealed = !self.is_occupied();
        self.seq = seq;
        self.len = 0;
        self.state = SlotState::Missing;
    }

    pub(crate) fn clear(&mut self) {
        self.release(0);
        self.concealed = false;
    }
}
