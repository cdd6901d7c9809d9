use std::sync::Arc;

use super::{
    jb_config::JitterBufferConfig,
    jb_error::JitterBufferError,
    jb_frame::{JbFrame, JbPhase, PutOutcome},
    jb_history::{Adjust, JbHistory},
    jb_slot::{JbSlot, SlotState},
};
use crate::{log::log_sink::LogSink, rtp::seq::seq_delta, sink_debug, sink_trace, sink_warn};

/// Counters exposed through [`JbState`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JbStats {
    pub puts: u64,
    pub frames: u64,
    pub missing: u64,
    /// Sequences consumed by non-audio packets.
    pub skipped: u64,
    pub late: u64,
    /// Late arrivals whose frame had already been concealed.
    pub late_after_loss: u64,
    pub duplicate: u64,
    pub resync: u64,
    /// Pulls that found the buffer completely empty.
    pub empty: u64,
    pub too_large: u64,
    pub grow: u64,
    pub shrink: u64,
}

/// Point-in-time view of the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct JbState {
    pub phase: JbPhase,
    pub capacity: u16,
    pub fill: u16,
    pub target_prefetch: u16,
    pub min_prefetch: u16,
    pub max_prefetch: u16,
    /// Next sequence to be released, once known.
    pub base_seq: Option<u16>,
    /// Late/missing rate of the last completed history window.
    pub event_rate: f64,
    pub last_frame: Option<JbFrame>,
    pub stats: JbStats,
}

/// Adaptive reorder and playout buffer.
///
/// Frames live in a fixed ring; the slot for `seq` is `(head + (seq - base)) mod capacity`
/// where `head` is the ring position of `base`. `put` never allocates.
pub struct JitterBuffer {
    cfg: JitterBufferConfig,
    slots: Vec<JbSlot>,
    head: usize,
    base: u16,
    /// Offset one past the newest stored frame, relative to `base`.
    end: u16,
    fill: u16,
    phase: JbPhase,
    /// Whether anything was released since the last (re)start.
    released: bool,
    target: u16,
    history: JbHistory,
    last_frame: Option<JbFrame>,
    stats: JbStats,
    logger: Arc<dyn LogSink>,
}

impl JitterBuffer {
    pub fn new(cfg: JitterBufferConfig, logger: Arc<dyn LogSink>) -> Result<Self, JitterBufferError> {
        cfg.validate()?;
        let slots = (0..cfg.capacity)
            .map(|_| JbSlot::new(cfg.max_frame_size))
            .collect();
        let history = JbHistory::new(
            cfg.history_len,
            cfg.grow_threshold,
            cfg.shrink_threshold,
            cfg.shrink_sustain,
        );
        Ok(Self {
            target: cfg.init_prefetch,
            cfg,
            slots,
            head: 0,
            base: 0,
            end: 0,
            fill: 0,
            phase: JbPhase::Init,
            released: false,
            history,
            last_frame: None,
            stats: JbStats::default(),
            logger,
        })
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn index(&self, offset: u16) -> usize {
        (self.head + usize::from(offset)) % self.capacity()
    }

    pub fn put(&mut self, seq: u16, timestamp: u32, payload: &[u8]) -> PutOutcome {
        self.stats.puts += 1;
        if payload.len() > self.cfg.max_frame_size {
            self.stats.too_large += 1;
            sink_debug!(self.logger, "[JB] frame seq={seq} too large ({} bytes)", payload.len());
            return PutOutcome::TooLarge;
        }
        self.insert(seq, timestamp, Some(payload))
    }

    /// Marks `seq` as taken by a packet that carries no audio (e.g. an
    /// RFC4733 event), so playout neither reports it missing nor conceals it.
    pub fn skip(&mut self, seq: u16, timestamp: u32) -> PutOutcome {
        self.insert(seq, timestamp, None)
    }

    fn insert(&mut self, seq: u16, timestamp: u32, payload: Option<&[u8]>) -> PutOutcome {
        if matches!(self.phase, JbPhase::Init | JbPhase::Resync) {
            self.restart_at(seq);
            self.store(0, seq, timestamp, payload);
            return PutOutcome::Stored;
        }

        let offset = i32::from(seq_delta(seq, self.base));
        if offset < 0 {
            let back = offset.unsigned_abs() as usize;
            // Before playout starts an earlier frame just moves the base back.
            if !self.released && usize::from(self.end) + back <= self.capacity() {
                self.head = (self.head + self.capacity() - back) % self.capacity();
                self.base = seq;
                self.end += back as u16;
                self.store(0, seq, timestamp, payload);
                return PutOutcome::Stored;
            }
            return self.on_late(seq, back);
        }

        if offset as usize >= self.capacity() {
            sink_warn!(
                self.logger,
                "[JB] gap of {offset} frames exceeds capacity {}, resyncing at seq={seq}",
                self.capacity()
            );
            self.stats.resync += 1;
            self.restart_at(seq);
            self.store(0, seq, timestamp, payload);
            return PutOutcome::Resync;
        }

        let offset = offset as u16;
        if self.slots[self.index(offset)].is_occupied() {
            self.stats.duplicate += 1;
            return PutOutcome::Duplicate;
        }
        self.store(offset, seq, timestamp, payload);
        PutOutcome::Stored
    }

    fn store(&mut self, offset: u16, seq: u16, timestamp: u32, payload: Option<&[u8]>) {
        let idx = self.index(offset);
        match payload {
            Some(payload) => self.slots[idx].fill(seq, timestamp, payload),
            None => self.slots[idx].skip(seq, timestamp),
        }
        self.fill += 1;
        self.end = self.end.max(offset + 1);
        sink_trace!(self.logger, "[JB] stored seq={seq} at slot {idx} fill={}", self.fill);
    }

    fn on_late(&mut self, seq: u16, back: usize) -> PutOutcome {
        self.stats.late += 1;
        self.history.record_late();
        // A released slot keeps the sequence it stood for until it is reused.
        if back <= self.capacity() {
            let idx = (self.head + self.capacity() - back) % self.capacity();
            let slot = &mut self.slots[idx];
            if slot.concealed && slot.seq == seq {
                slot.state = SlotState::LateDropped;
                self.stats.late_after_loss += 1;
            }
        }
        sink_debug!(self.logger, "[JB] late frame seq={seq} (base={})", self.base);
        PutOutcome::Late
    }

    fn restart_at(&mut self, seq: u16) {
        self.clear_slots();
        self.base = seq;
        self.phase = JbPhase::Sync;
    }

    fn clear_slots(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        self.head = 0;
        self.end = 0;
        self.fill = 0;
        self.released = false;
    }

    /// Pulls the next frame in sequence order. On `Frame` the payload is in `out`.
    pub fn get(&mut self, out: &mut Vec<u8>) -> JbFrame {
        out.clear();
        let frame = self.pull(out);
        if frame != JbFrame::NotReady {
            self.last_frame = Some(frame);
        }
        frame
    }

    fn pull(&mut self, out: &mut Vec<u8>) -> JbFrame {
        match self.phase {
            JbPhase::Init | JbPhase::Resync => return JbFrame::NotReady,
            JbPhase::Sync => {
                if self.fill < self.target {
                    return JbFrame::NotReady;
                }
                sink_debug!(
                    self.logger,
                    "[JB] prefetch reached ({} frames), starting playout at seq={}",
                    self.fill,
                    self.base
                );
                self.phase = JbPhase::Normal;
            }
            JbPhase::Normal => {}
        }

        if self.fill == 0 {
            self.stats.empty += 1;
            self.phase = JbPhase::Sync;
            sink_debug!(self.logger, "[JB] underflow at seq={}, re-prefetching", self.base);
            self.adapt(true);
            return JbFrame::Empty;
        }

        let seq = self.base;
        let idx = self.head;
        let slot = &mut self.slots[idx];
        let frame = match slot.state {
            SlotState::Filled => {
                out.extend_from_slice(slot.payload());
                let timestamp = slot.timestamp;
                self.fill -= 1;
                self.stats.frames += 1;
                JbFrame::Frame { seq, timestamp }
            }
            SlotState::Skipped => {
                self.fill -= 1;
                self.stats.skipped += 1;
                JbFrame::Skipped { seq }
            }
            SlotState::Missing | SlotState::LateDropped => {
                self.stats.missing += 1;
                JbFrame::Missing { seq }
            }
        };
        slot.release(seq);

        self.head = (self.head + 1) % self.capacity();
        self.base = self.base.wrapping_add(1);
        self.end = self.end.saturating_sub(1);
        self.released = true;
        self.adapt(matches!(frame, JbFrame::Missing { .. }));
        frame
    }

    fn adapt(&mut self, missing: bool) {
        match self.history.record_pull(missing) {
            Some(Adjust::Grow) if self.target < self.cfg.max_prefetch => {
                self.target = (self.target + self.cfg.step).min(self.cfg.max_prefetch);
                self.stats.grow += 1;
                sink_debug!(
                    self.logger,
                    "[JB] late/missing rate {:.3}, prefetch -> {}",
                    self.history.last_rate(),
                    self.target
                );
            }
            Some(Adjust::Shrink) if self.target > self.cfg.min_prefetch => {
                self.target = self
                    .target
                    .saturating_sub(self.cfg.step)
                    .max(self.cfg.min_prefetch);
                self.stats.shrink += 1;
                sink_debug!(self.logger, "[JB] stable, prefetch -> {}", self.target);
            }
            _ => {}
        }
    }

    /// Drops everything buffered; the next frame restarts prefetching.
    /// Used when the RTP session resynchronizes.
    pub fn flush(&mut self) {
        self.clear_slots();
        if self.phase != JbPhase::Init {
            self.phase = JbPhase::Resync;
            self.stats.resync += 1;
        }
    }

    pub fn target_prefetch(&self) -> u16 {
        self.target
    }

    pub fn phase(&self) -> JbPhase {
        self.phase
    }

    pub fn last_frame(&self) -> Option<JbFrame> {
        self.last_frame
    }

    pub fn reset_stats(&mut self) {
        self.stats = JbStats::default();
    }

    /// Payload bytes a slot can hold.
    pub fn max_frame_size(&self) -> usize {
        self.slots.first().map_or(0, JbSlot::capacity)
    }

    pub fn state(&self) -> JbState {
        JbState {
            phase: self.phase,
            capacity: self.cfg.capacity,
            fill: self.fill,
            target_prefetch: self.target,
            min_prefetch: self.cfg.min_prefetch,
            max_prefetch: self.cfg.max_prefetch,
            base_seq: (self.phase != JbPhase::Init).then_some(self.base),
            event_rate: self.history.last_rate(),
            last_frame: self.last_frame,
            stats: self.stats.clone(),
        }
    }
}
