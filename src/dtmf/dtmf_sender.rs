use std::{collections::VecDeque, sync::Arc};

use super::{
    dtmf_config::DtmfConfig,
    dtmf_digit::digit_to_event,
    dtmf_error::DtmfError,
    telephone_event::{TELEPHONE_EVENT_LEN, TelephoneEvent},
};
use crate::{log::log_sink::LogSink, sink_debug, sink_trace};

/// One telephone-event packet ready to be wrapped in an RTP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtmfPacket {
    pub payload: [u8; TELEPHONE_EVENT_LEN],
    pub marker: bool,
    /// Event onset timestamp; the same for every packet of one digit.
    pub timestamp: u32,
}

#[derive(Debug, Clone, Copy)]
struct PendingDigit {
    event: u8,
    total: u32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDigit {
    event: u8,
    total: u32,
    onset_ts: u32,
    elapsed: u32,
    started: bool,
    end_sent: u32,
}

/// Outgoing RFC4733 state machine, driven once per media frame tick.
pub struct DtmfSender {
    cfg: DtmfConfig,
    clock_rate: u32,
    pending: VecDeque<PendingDigit>,
    active: Option<ActiveDigit>,
    digits_sent: u64,
    logger: Arc<dyn LogSink>,
}

impl DtmfSender {
    pub fn new(cfg: DtmfConfig, clock_rate: u32, logger: Arc<dyn LogSink>) -> Self {
        Self {
            cfg,
            clock_rate,
            pending: VecDeque::new(),
            active: None,
            digits_sent: 0,
            logger,
        }
    }

    /// Queues `digits` for transmission. The whole string is validated
    /// before anything is queued.
    pub fn dial(&mut self, digits: &str, duration_ms: u32) -> Result<(), DtmfError> {
        if self.is_sending() {
            return Err(DtmfError::Busy);
        }
        let count = digits.chars().count();
        if count == 0 {
            return Err(DtmfError::Empty);
        }
        if count > self.cfg.max_digits {
            return Err(DtmfError::TooManyDigits {
                given: count,
                max: self.cfg.max_digits,
            });
        }
        let events = digits
            .chars()
            .map(|c| digit_to_event(c, self.cfg.allow_flash))
            .collect::<Result<Vec<_>, _>>()?;

        let ms = if duration_ms == 0 {
            self.cfg.default_duration_ms
        } else {
            duration_ms
        };
        let total = (u64::from(ms) * u64::from(self.clock_rate) / 1000)
            .clamp(1, u64::from(u16::MAX)) as u32;
        self.pending
            .extend(events.into_iter().map(|event| PendingDigit { event, total }));
        sink_debug!(self.logger, "[DTMF] dial {digits:?} ({ms} ms, {total} ts units each)");
        Ok(())
    }

    pub fn is_sending(&self) -> bool {
        self.active.is_some() || !self.pending.is_empty()
    }

    pub fn digits_sent(&self) -> u64 {
        self.digits_sent
    }

    /// Produces the event packet for this frame tick, if any.
    ///
    /// `next_ts` is the running media timestamp and becomes the onset
    /// timestamp when a new digit starts; `ts_len` is one frame.
    pub fn poll(&mut self, next_ts: u32, ts_len: u32) -> Option<DtmfPacket> {
        if self.active.is_none() {
            let next = self.pending.pop_front()?;
            self.active = Some(ActiveDigit {
                event: next.event,
                total: next.total,
                onset_ts: next_ts,
                elapsed: 0,
                started: false,
                end_sent: 0,
            });
        }
        let cur = self.active.as_mut()?;

        let marker = !cur.started;
        cur.started = true;
        if cur.end_sent == 0 {
            cur.elapsed = cur.elapsed.saturating_add(ts_len).min(u32::from(u16::MAX));
        }
        let end = cur.end_sent > 0 || cur.elapsed >= cur.total;
        let payload = TelephoneEvent {
            event: cur.event,
            end,
            volume: self.cfg.volume,
            duration: cur.elapsed as u16,
        }
        .encode();
        let pkt = DtmfPacket {
            payload,
            marker,
            timestamp: cur.onset_ts,
        };

        if end {
            cur.end_sent += 1;
            if cur.end_sent > self.cfg.end_retransmit {
                sink_trace!(
                    self.logger,
                    "[DTMF] event {} done after {} ts units",
                    cur.event,
                    cur.elapsed
                );
                self.active = None;
                self.digits_sent += 1;
            }
        }
        Some(pkt)
    }

    /// Drops anything queued or in flight.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;

    fn sender() -> DtmfSender {
        DtmfSender::new(DtmfConfig::default(), 8000, Arc::new(NoopLogSink))
    }

    fn drain(tx: &mut DtmfSender, mut ts: u32) -> Vec<DtmfPacket> {
        let mut out = Vec::new();
        while let Some(p) = tx.poll(ts, 160) {
            out.push(p);
            ts = ts.wrapping_add(160);
        }
        out
    }

    #[test]
    fn single_digit_packet_sequence() {
        let mut tx = sender();
        tx.dial("5", 0).unwrap();
        let pkts = drain(&mut tx, 1000);

        // 200 ms = 1600 ts units = 10 frames, plus two end retransmits
        assert_eq!(pkts.len(), 12);
        assert!(pkts[0].marker);
        assert!(pkts[1..].iter().all(|p| !p.marker));
        assert!(pkts.iter().all(|p| p.timestamp == 1000));

        let first = TelephoneEvent::decode(&pkts[0].payload).unwrap();
        assert_eq!((first.event, first.duration, first.end), (5, 160, false));
        let ninth = TelephoneEvent::decode(&pkts[8].payload).unwrap();
        assert!(!ninth.end);

        let ends = &pkts[9..];
        assert!(ends.iter().all(|p| p.payload == pkts[9].payload));
        let end = TelephoneEvent::decode(&ends[0].payload).unwrap();
        assert!(end.end);
        assert_eq!(end.duration, 1600);
        assert_eq!(end.volume, 10);
        assert!(!tx.is_sending());
        assert_eq!(tx.digits_sent(), 1);
    }

    #[test]
    fn digits_follow_each_other_with_new_onsets() {
        let mut tx = sender();
        tx.dial("1#", 40).unwrap();
        let pkts = drain(&mut tx, 0);
        // 40 ms = 320 units = 2 frames + 2 retransmits per digit
        assert_eq!(pkts.len(), 8);
        assert_eq!(pkts[0].timestamp, 0);
        assert!(pkts[4].marker);
        assert_eq!(pkts[4].timestamp, 4 * 160);
        assert_eq!(TelephoneEvent::decode(&pkts[4].payload).unwrap().event, 11);
    }

    #[test]
    fn busy_while_sending_and_validation() {
        let mut tx = sender();
        assert_eq!(tx.dial("12x", 0), Err(DtmfError::InvalidDigit('x')));
        assert!(!tx.is_sending());
        assert_eq!(tx.dial("", 0), Err(DtmfError::Empty));
        let long = "1".repeat(33);
        assert!(matches!(tx.dial(&long, 0), Err(DtmfError::TooManyDigits { given: 33, .. })));

        tx.dial("9", 0).unwrap();
        assert_eq!(tx.dial("1", 0), Err(DtmfError::Busy));
        tx.poll(0, 160).unwrap();
        assert_eq!(tx.dial("1", 0), Err(DtmfError::Busy));
        tx.cancel();
        assert!(tx.dial("1", 0).is_ok());
    }

    #[test]
    fn idle_sender_yields_nothing() {
        let mut tx = sender();
        assert!(tx.poll(0, 160).is_none());
    }
}
