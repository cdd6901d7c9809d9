use super::{dup_window::DupWindow, seq_ext::SeqExt};

/// RFC3550 A.1 default for how far back a packet may arrive and still count
/// as reordered rather than a restart.
pub const DEFAULT_MAX_MISORDER: u16 = 100;
/// Packets a source may send while unvalidated before they are dropped.
pub const DEFAULT_PROBATION_LIMIT: u32 = 50;

/// What the receive path should do with a packet that parsed correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxDecision {
    /// Deliver downstream. Only `validated` packets feed statistics.
    Accept { ext_seq: u32, validated: bool },
    /// The sequence baseline was reset (new source, or a large jump that a
    /// following packet confirmed). Flush downstream state, then deliver.
    Resync { ext_seq: u32, validated: bool },
    /// Already seen inside the duplicate window. Drop it.
    Duplicate,
    /// Not delivered: either an unconfirmed large jump, or a source that
    /// stayed unvalidated past the probation limit.
    Discard,
}

/// Inbound source validation (RFC3550 A.1 probation, `max_dropout` /
/// `max_misorder` windows, `bad_seq` confirmation) and sequence
/// linearization for the single remote source of a stream.
#[derive(Debug, Clone)]
pub struct RxTracker {
    probation_len: u32,
    probation_limit: u32,
    max_dropout: u16,
    max_misorder: u16,

    ssrc: Option<u32>,
    max_seq: u16,
    seqext: SeqExt,
    /// Contiguous packets still required before the source is trusted.
    probation: u32,
    /// Packets received from the current source while unvalidated.
    tentative: u32,
    /// Sequence that would confirm a pending large jump.
    bad_seq: Option<u16>,
    dups: DupWindow,

    duplicates: u64,
    resyncs: u64,
    source_changes: u64,
    discarded: u64,
}

impl RxTracker {
    pub fn new(probation_len: u32, max_dropout: u16) -> Self {
        Self::with_limits(probation_len, max_dropout, DEFAULT_MAX_MISORDER, DEFAULT_PROBATION_LIMIT)
    }

    /// `max_dropout + max_misorder` must leave room in the 16-bit space for
    /// the jump region; `max_misorder` is clamped to keep it non-empty.
    pub fn with_limits(
        probation_len: u32,
        max_dropout: u16,
        max_misorder: u16,
        probation_limit: u32,
    ) -> Self {
        let max_dropout = max_dropout.max(1);
        let max_misorder = max_misorder.min(u16::MAX - max_dropout);
        Self {
            probation_len: probation_len.max(1),
            probation_limit: probation_limit.max(probation_len),
            max_dropout,
            max_misorder,
            ssrc: None,
            max_seq: 0,
            seqext: SeqExt::default(),
            probation: 0,
            tentative: 0,
            bad_seq: None,
            dups: DupWindow::default(),
            duplicates: 0,
            resyncs: 0,
            source_changes: 0,
            discarded: 0,
        }
    }

    pub fn on_packet(&mut self, ssrc: u32, seq: u16) -> RxDecision {
        let decision = self.classify(ssrc, seq);
        let validated = match decision {
            RxDecision::Accept { validated, .. } | RxDecision::Resync { validated, .. } => validated,
            RxDecision::Duplicate | RxDecision::Discard => return decision,
        };
        if validated {
            self.tentative = 0;
            return decision;
        }
        self.tentative = self.tentative.saturating_add(1);
        if self.tentative > self.probation_limit {
            self.discarded += 1;
            return RxDecision::Discard;
        }
        decision
    }

    fn classify(&mut self, ssrc: u32, seq: u16) -> RxDecision {
        if self.ssrc != Some(ssrc) {
            let had_source = self.ssrc.is_some();
            self.ssrc = Some(ssrc);
            self.restart(seq);
            self.tentative = 0;
            // the first packet counts toward probation
            self.probation = self.probation_len - 1;
            let ext_seq = self.seqext.current();
            let validated = self.probation == 0;
            if had_source {
                self.source_changes += 1;
                return RxDecision::Resync { ext_seq, validated };
            }
            return RxDecision::Accept { ext_seq, validated };
        }

        let udelta = seq.wrapping_sub(self.max_seq);
        if udelta == 0 {
            self.duplicates += 1;
            return RxDecision::Duplicate;
        }

        if udelta < self.max_dropout {
            // in order, possibly with a gap
            self.seqext.update(seq);
            self.max_seq = seq;
            self.bad_seq = None;
            self.dups.advance(u32::from(udelta));
            if self.probation > 0 {
                if udelta == 1 {
                    self.probation -= 1;
                } else {
                    self.probation = self.probation_len - 1;
                }
            }
            return RxDecision::Accept {
                ext_seq: self.seqext.current(),
                validated: self.probation == 0,
            };
        }

        let back = u32::from(udelta.wrapping_neg());
        if back <= u32::from(self.max_misorder) {
            // late or reordered; the jitter buffer decides whether it is usable
            if self.dups.check_and_record(back) {
                self.duplicates += 1;
                return RxDecision::Duplicate;
            }
            if self.probation > 0 {
                self.probation = self.probation_len - 1;
            }
            return RxDecision::Accept {
                ext_seq: self.seqext.current().saturating_sub(back),
                validated: self.probation == 0,
            };
        }

        // Large jump: only trusted once the very next sequence follows it.
        if self.bad_seq != Some(seq) {
            self.bad_seq = Some(seq.wrapping_add(1));
            self.discarded += 1;
            return RxDecision::Discard;
        }
        self.bad_seq = None;
        self.restart(seq);
        self.resyncs += 1;
        if self.probation > 0 {
            self.probation = self.probation_len - 1;
        }
        RxDecision::Resync {
            ext_seq: self.seqext.current(),
            validated: self.probation == 0,
        }
    }

    fn restart(&mut self, seq: u16) {
        self.seqext = SeqExt::starting_at(seq);
        self.max_seq = seq;
        self.dups.reset();
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.ssrc
    }

    pub fn highest_ext_seq(&self) -> u32 {
        self.seqext.current()
    }

    pub fn is_validated(&self) -> bool {
        self.ssrc.is_some() && self.probation == 0
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    pub fn source_changes(&self) -> u64 {
        self.source_changes
    }

    /// Unconfirmed jumps plus packets from a source stuck in probation.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(ext_seq: u32, validated: bool) -> RxDecision {
        RxDecision::Accept { ext_seq, validated }
    }

    #[test]
    fn new_source_is_trusted_after_probation() {
        let mut rx = RxTracker::new(3, 32);
        assert_eq!(rx.on_packet(1, 100), accept(100, false));
        assert_eq!(rx.on_packet(1, 101), accept(101, false));
        assert!(!rx.is_validated());
        assert_eq!(rx.on_packet(1, 102), accept(102, true));
        assert!(rx.is_validated());
    }

    #[test]
    fn gap_during_probation_restarts_the_count() {
        let mut rx = RxTracker::new(2, 32);
        assert_eq!(rx.on_packet(1, 10), accept(10, false));
        assert_eq!(rx.on_packet(1, 12), accept(12, false));
        assert_eq!(rx.on_packet(1, 13), accept(13, true));
    }

    #[test]
    fn wraparound_is_newer_not_late() {
        let mut rx = RxTracker::new(1, 32);
        assert_eq!(rx.on_packet(5, 65534), accept(65534, true));
        assert_eq!(rx.on_packet(5, 65535), accept(65535, true));
        assert_eq!(rx.on_packet(5, 0), accept(65536, true));
        assert_eq!(rx.on_packet(5, 1), accept(65537, true));
        assert_eq!(rx.duplicates(), 0);
    }

    #[test]
    fn duplicates_are_dropped_without_moving_state() {
        let mut rx = RxTracker::new(1, 32);
        rx.on_packet(5, 10);
        rx.on_packet(5, 12);
        assert_eq!(rx.on_packet(5, 12), RxDecision::Duplicate);
        assert_eq!(rx.on_packet(5, 11), accept(11, true));
        assert_eq!(rx.on_packet(5, 11), RxDecision::Duplicate);
        assert_eq!(rx.on_packet(5, 10), RxDecision::Duplicate);
        assert_eq!(rx.duplicates(), 3);
        assert_eq!(rx.highest_ext_seq(), 12);
    }

    #[test]
    fn large_jump_resyncs_once_confirmed() {
        let mut rx = RxTracker::new(1, 32);
        rx.on_packet(5, 1000);
        assert_eq!(rx.on_packet(5, 2000), RxDecision::Discard);
        assert_eq!(
            rx.on_packet(5, 2001),
            RxDecision::Resync {
                ext_seq: 2001,
                validated: true
            }
        );
        assert_eq!(rx.on_packet(5, 2002), accept(2002, true));
        assert_eq!(rx.resyncs(), 1);
        assert_eq!(rx.discarded(), 1);
    }

    #[test]
    fn isolated_jump_is_dropped_without_moving_state() {
        let mut rx = RxTracker::new(1, 32);
        rx.on_packet(5, 1000);
        assert_eq!(rx.on_packet(5, 3000), RxDecision::Discard);
        assert_eq!(rx.on_packet(5, 1001), accept(1001, true));
        assert_eq!(rx.resyncs(), 0);
        assert_eq!(rx.highest_ext_seq(), 1001);
    }

    #[test]
    fn stale_packet_is_reordered_not_a_restart() {
        let mut rx = RxTracker::new(1, 32);
        for seq in (100..=140).filter(|&s| s != 105) {
            rx.on_packet(5, seq);
        }
        // 35 behind: past max_dropout but inside the misorder window
        assert_eq!(rx.on_packet(5, 105), accept(105, true));
        assert_eq!(rx.on_packet(5, 141), accept(141, true));
        assert_eq!(rx.resyncs(), 0);
        assert_eq!(rx.discarded(), 0);
    }

    #[test]
    fn source_stuck_in_probation_is_discarded() {
        let mut rx = RxTracker::with_limits(2, 32, 100, 4);
        // every other sequence: probation never completes
        let decisions: Vec<_> = (0..6u16).map(|i| rx.on_packet(9, i * 2)).collect();
        assert!(matches!(decisions[3], RxDecision::Accept { validated: false, .. }));
        assert_eq!(decisions[4], RxDecision::Discard);
        assert_eq!(decisions[5], RxDecision::Discard);
        assert_eq!(rx.discarded(), 2);
        // a contiguous run still validates it
        assert_eq!(rx.on_packet(9, 11), accept(11, true));
        assert_eq!(rx.on_packet(9, 12), accept(12, true));
    }

    #[test]
    fn ssrc_change_resyncs_and_reenters_probation() {
        let mut rx = RxTracker::new(2, 32);
        rx.on_packet(5, 10);
        rx.on_packet(5, 11);
        assert!(rx.is_validated());
        assert_eq!(
            rx.on_packet(6, 500),
            RxDecision::Resync {
                ext_seq: 500,
                validated: false
            }
        );
        assert_eq!(rx.ssrc(), Some(6));
        assert_eq!(rx.on_packet(6, 501), accept(501, true));
        assert_eq!(rx.source_changes(), 1);
    }
}
