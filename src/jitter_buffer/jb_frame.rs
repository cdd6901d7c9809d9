/// Result of one pull from the jitter buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JbFrame {
    /// Payload was copied into the caller's buffer.
    Frame { seq: u16, timestamp: u32 },
    /// Nothing arrived for `seq`; the decoder should conceal it.
    Missing { seq: u16 },
    /// `seq` was used by a non-audio packet. Play silence, do not conceal.
    Skipped { seq: u16 },
    /// Still prefetching.
    NotReady,
    /// Underflow: nothing buffered at all. The buffer went back to prefetching.
    Empty,
}

/// What `put` did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored,
    /// Older than the playout point; dropped.
    Late,
    /// Slot already filled; dropped.
    Duplicate,
    /// Gap did not fit the ring. The buffer was flushed and restarted at this frame.
    Resync,
    /// Payload bigger than a slot; dropped.
    TooLarge,
}

/// Buffer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JbPhase {
    /// Nothing received yet.
    Init,
    /// Accumulating until the prefetch level is reached.
    Sync,
    /// Steady playout, one slot per pull.
    Normal,
    /// Flushed; the next frame restarts prefetching.
    Resync,
}
