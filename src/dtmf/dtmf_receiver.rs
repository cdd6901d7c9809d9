use std::{collections::VecDeque, sync::Arc};

use super::{
    dtmf_digit::{EVENT_FLASH, event_to_digit},
    dtmf_event::DtmfEvent,
    telephone_event::TelephoneEvent,
};
use crate::{log::log_sink::LogSink, sink_debug, sink_trace, sink_warn};

#[derive(Debug, Clone, Copy)]
struct RxEvent {
    event: u8,
    timestamp: u32,
    duration: u32,
}

/// Incoming telephone-event tracking with end-packet debouncing.
///
/// Each event is identified by `(event code, onset timestamp)`. An event is
/// finalized by its E-bit packet, by the onset of a different event, or by
/// audio newer than the onset. Once finalized, further packets with the
/// same identity are ignored.
pub struct DtmfReceiver {
    clock_rate: u32,
    current: Option<RxEvent>,
    last_finalized: [Option<u32>; EVENT_FLASH as usize + 1],
    queue: VecDeque<char>,
    queue_capacity: usize,
    observer_attached: bool,
    digits: u64,
    dropped: u64,
    unknown_events: u64,
    logger: Arc<dyn LogSink>,
}

impl DtmfReceiver {
    pub fn new(clock_rate: u32, queue_capacity: usize, logger: Arc<dyn LogSink>) -> Self {
        Self {
            clock_rate: clock_rate.max(1),
            current: None,
            last_finalized: [None; EVENT_FLASH as usize + 1],
            queue: VecDeque::with_capacity(queue_capacity),
            queue_capacity,
            observer_attached: false,
            digits: 0,
            dropped: 0,
            unknown_events: 0,
            logger,
        }
    }

    /// While attached, finalized digits are not queued.
    pub fn set_observer_attached(&mut self, attached: bool) {
        self.observer_attached = attached;
    }

    /// Feeds one telephone-event packet carried at RTP timestamp `ts`.
    /// Returns the notifications to hand to an observer, in order.
    pub fn on_event(&mut self, ev: &TelephoneEvent, ts: u32) -> Vec<DtmfEvent> {
        let Some(digit) = event_to_digit(ev.event) else {
            self.unknown_events += 1;
            sink_trace!(self.logger, "[DTMF] ignoring event code {}", ev.event);
            return Vec::new();
        };
        if self.last_finalized[usize::from(ev.event)] == Some(ts) {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(2);
        let duration = u32::from(ev.duration);
        let same = matches!(self.current, Some(c) if c.event == ev.event && c.timestamp == ts);
        if same {
            if let Some(cur) = self.current.as_mut() {
                cur.duration = cur.duration.max(duration);
            }
            if let (false, Some(cur)) = (ev.end, self.current) {
                out.push(self.notification(digit, cur, true, false));
            }
        } else {
            self.finalize_current();
            let cur = RxEvent {
                event: ev.event,
                timestamp: ts,
                duration,
            };
            sink_debug!(self.logger, "[DTMF] onset {digit:?} at ts {ts}");
            self.current = Some(cur);
            out.push(self.notification(digit, cur, false, false));
        }

        if ev.end {
            if let Some(cur) = self.current {
                out.push(self.notification(digit, cur, false, true));
            }
            self.finalize_current();
        }
        out
    }

    /// An audio packet at `ts` ends any event with an older onset.
    pub fn on_audio(&mut self, ts: u32) {
        if let Some(cur) = self.current {
            if (ts.wrapping_sub(cur.timestamp) as i32) > 0 {
                sink_trace!(self.logger, "[DTMF] audio at {ts} ends event without E bit");
                self.finalize_current();
            }
        }
    }

    /// Removes up to `max` queued digits, oldest first.
    pub fn take_digits(&mut self, max: usize) -> Vec<char> {
        let n = max.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    pub fn has_digits(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn digits_received(&self) -> u64 {
        self.digits
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn unknown_events(&self) -> u64 {
        self.unknown_events
    }

    /// Forgets the in-progress event, e.g. after the remote source restarts.
    pub fn reset(&mut self) {
        self.current = None;
        self.last_finalized = [None; EVENT_FLASH as usize + 1];
    }

    fn finalize_current(&mut self) {
        let Some(cur) = self.current.take() else {
            return;
        };
        self.last_finalized[usize::from(cur.event)] = Some(cur.timestamp);
        self.digits += 1;
        if self.observer_attached {
            return;
        }
        let Some(digit) = event_to_digit(cur.event) else {
            return;
        };
        if self.queue.len() >= self.queue_capacity {
            self.dropped += 1;
            sink_warn!(self.logger, "[DTMF] digit queue full, dropping {digit:?}");
        } else {
            self.queue.push_back(digit);
        }
    }

    fn notification(&self, digit: char, ev: RxEvent, is_update: bool, is_end: bool) -> DtmfEvent {
        DtmfEvent {
            digit,
            timestamp: ev.timestamp,
            duration_ms: (u64::from(ev.duration) * 1000 / u64::from(self.clock_rate)) as u32,
            is_update,
            is_end,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;

    fn rx() -> DtmfReceiver {
        DtmfReceiver::new(8000, 4, Arc::new(NoopLogSink))
    }

    fn te(event: u8, duration: u16, end: bool) -> TelephoneEvent {
        TelephoneEvent {
            event,
            end,
            volume: 10,
            duration,
        }
    }

    #[test]
    fn onset_updates_and_single_end() {
        let mut r = rx();
        let n = r.on_event(&te(5, 160, false), 800);
        assert_eq!(n.len(), 1);
        assert!(n[0].is_onset());
        assert_eq!(n[0].digit, '5');

        let n = r.on_event(&te(5, 320, false), 800);
        assert!(n[0].is_update);
        assert_eq!(n[0].duration_ms, 40);

        let n = r.on_event(&te(5, 1600, true), 800);
        assert_eq!(n.len(), 1);
        assert!(n[0].is_end);
        assert_eq!(n[0].duration_ms, 200);

        // retransmitted end packets are swallowed
        assert!(r.on_event(&te(5, 1600, true), 800).is_empty());
        assert!(r.on_event(&te(5, 1600, true), 800).is_empty());

        assert_eq!(r.take_digits(10), vec!['5']);
        assert_eq!(r.digits_received(), 1);
    }

    #[test]
    fn lone_end_packet_still_counts_once() {
        let mut r = rx();
        let n = r.on_event(&te(11, 800, true), 0);
        assert_eq!(n.len(), 2);
        assert!(n[0].is_onset());
        assert!(n[1].is_end);
        assert_eq!(r.take_digits(10), vec!['#']);
    }

    #[test]
    fn new_event_or_audio_finalizes_silently() {
        let mut r = rx();
        r.on_event(&te(1, 160, false), 0);
        let n = r.on_event(&te(2, 160, false), 1600);
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].digit, '2');

        r.on_audio(1000); // older than the onset of '2'
        assert_eq!(r.take_digits(10), vec!['1']);
        r.on_audio(3200);
        assert_eq!(r.take_digits(10), vec!['2']);

        // late end packet for '2' after audio finalized it
        assert!(r.on_event(&te(2, 1600, true), 1600).is_empty());
        assert!(!r.has_digits());
    }

    #[test]
    fn same_digit_new_onset_is_a_new_press() {
        let mut r = rx();
        r.on_event(&te(7, 800, true), 0);
        let n = r.on_event(&te(7, 160, false), 4000);
        assert!(n[0].is_onset());
        r.on_event(&te(7, 800, true), 4000);
        assert_eq!(r.take_digits(10), vec!['7', '7']);
    }

    #[test]
    fn queue_overflow_drops_newest() {
        let mut r = rx();
        for i in 0..6u32 {
            r.on_event(&te(i as u8, 160, true), i * 1000);
        }
        assert_eq!(r.dropped(), 2);
        assert_eq!(r.take_digits(2), vec!['0', '1']);
        assert_eq!(r.take_digits(10), vec!['2', '3']);
    }

    #[test]
    fn observer_mode_bypasses_queue_and_unknown_codes_are_ignored() {
        let mut r = rx();
        r.set_observer_attached(true);
        r.on_event(&te(3, 160, true), 0);
        assert!(!r.has_digits());
        assert!(r.on_event(&te(40, 160, false), 10).is_empty());
        assert_eq!(r.unknown_events(), 1);
    }
}
