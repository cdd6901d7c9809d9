use crate::rtcp::report_block::ReportBlock;
use crate::rtp::time::NtpTime;

/// Receive-side accounting for the remote source (RFC3550 A.3 and A.8).
#[derive(Debug, Default, Clone)]
pub struct RxStats {
    // sequence/loss
    base_ext_seq: Option<u32>,
    highest_ext_seq: u32,
    received: u32,
    expected_prior: u32,
    received_prior: u32,
    last_fraction_lost: u8,

    packets: u64,
    octets: u64,

    // jitter in RTP timestamp units
    jitter: f64,
    last_transit: Option<u32>,
    last_ts: Option<u32>,

    // SR timing for LSR/DLSR
    last_sr_compact: Option<u32>,
    last_sr_arrival_compact: u32,
}

impl RxStats {
    /// Call on every validated, non-duplicate RTP packet.
    /// `arrival_rtp_units` is the arrival time on the media clock, in RTP clock units.
    pub fn on_rtp(&mut self, ext_seq: u32, rtp_ts: u32, arrival_rtp_units: u32, payload_len: usize) {
        match self.base_ext_seq {
            None => {
                self.base_ext_seq = Some(ext_seq);
                self.highest_ext_seq = ext_seq;
            }
            Some(_) if ext_seq > self.highest_ext_seq => self.highest_ext_seq = ext_seq,
            Some(_) => {}
        }
        self.received = self.received.wrapping_add(1);
        self.packets += 1;
        self.octets += payload_len as u64;

        // Packets repeating the previous timestamp (RFC4733 event updates)
        // were not sampled at their send time and say nothing about jitter.
        if self.last_ts == Some(rtp_ts) {
            return;
        }
        self.last_ts = Some(rtp_ts);
        let transit = arrival_rtp_units.wrapping_sub(rtp_ts);
        if let Some(prev) = self.last_transit {
            let d = f64::from((transit.wrapping_sub(prev) as i32).unsigned_abs());
            self.jitter += (d - self.jitter) / 16.0;
        }
        self.last_transit = Some(transit);
    }

    /// Sequence baseline changed (source restart). Loss accounting starts over.
    pub fn restart(&mut self) {
        self.base_ext_seq = None;
        self.highest_ext_seq = 0;
        self.received = 0;
        self.expected_prior = 0;
        self.received_prior = 0;
        self.last_transit = None;
        self.last_ts = None;
    }

    pub fn on_sr_received(&mut self, sr_ntp: NtpTime, now: NtpTime) {
        self.last_sr_compact = Some(sr_ntp.compact());
        self.last_sr_arrival_compact = now.compact();
    }

    pub fn expected(&self) -> u32 {
        match self.base_ext_seq {
            Some(base) => self.highest_ext_seq.wrapping_sub(base).wrapping_add(1),
            None => 0,
        }
    }

    pub fn cumulative_lost(&self) -> i64 {
        i64::from(self.expected()) - i64::from(self.received)
    }

    /// Builds the report block for `ssrc` and starts a new loss interval.
    pub fn build_report_block(&mut self, ssrc: u32, now: NtpTime) -> ReportBlock {
        let expected = self.expected();
        let exp_interval = expected.wrapping_sub(self.expected_prior);
        let rec_interval = self.received.wrapping_sub(self.received_prior);
        self.expected_prior = expected;
        self.received_prior = self.received;

        let lost_interval = i64::from(exp_interval) - i64::from(rec_interval);
        let fraction_lost = if exp_interval == 0 || lost_interval <= 0 {
            0
        } else {
            ((lost_interval << 8) / i64::from(exp_interval)).min(255) as u8
        };
        self.last_fraction_lost = fraction_lost;

        let (lsr, dlsr) = match self.last_sr_compact {
            Some(lsr) => (lsr, now.compact().wrapping_sub(self.last_sr_arrival_compact)),
            None => (0, 0),
        };

        ReportBlock {
            ssrc,
            fraction_lost,
            cumulative_lost: self.cumulative_lost().clamp(i64::from(i32::MIN), i64::from(i32::MAX))
                as i32,
            highest_seq_no_received: self.highest_ext_seq,
            interarrival_jitter: self.jitter as u32,
            lsr,
            dlsr,
        }
    }

    pub fn has_data(&self) -> bool {
        self.base_ext_seq.is_some()
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn packets(&self) -> u64 {
        self.packets
    }

    pub fn octets(&self) -> u64 {
        self.octets
    }

    pub fn highest_ext_seq(&self) -> u32 {
        self.highest_ext_seq
    }

    pub fn last_fraction_lost(&self) -> u8 {
        self.last_fraction_lost
    }

    /// Clears the counters a caller may reset; loss intervals and SR timing survive.
    pub fn reset_counters(&mut self) {
        self.packets = 0;
        self.octets = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn jitter_follows_the_exponential_filter() {
        let mut rx = RxStats::default();
        let d = 40.0;
        // sender steps 160, arrivals step 200: every transit differs by 40
        for i in 0..=200u32 {
            rx.on_rtp(i, i * 160, i * 200, 160);
            let n = i as i32;
            let expected = d * (1.0 - (15.0f64 / 16.0).powi(n));
            assert!((rx.jitter() - expected).abs() < 1e-9, "n={n}");
        }
        assert!((rx.jitter() - d).abs() < 0.01);
    }

    #[test]
    fn repeated_timestamps_do_not_feed_jitter() {
        let mut rx = RxStats::default();
        // audio at 0..5, a 6-packet event burst pinned to ts 800, audio again
        for i in 0..5u32 {
            rx.on_rtp(i, i * 160, i * 160, 160);
        }
        for i in 5..11u32 {
            rx.on_rtp(i, 800, i * 160, 4);
        }
        for i in 11..15u32 {
            rx.on_rtp(i, i * 160, i * 160, 160);
        }
        assert_eq!(rx.jitter(), 0.0);
        assert_eq!(rx.packets(), 15);
        assert_eq!(rx.cumulative_lost(), 0);
    }

    #[test]
    fn fraction_lost_covers_only_the_last_interval() {
        let mut rx = RxStats::default();
        let now = NtpTime::default();
        for seq in [0u32, 1, 2, 3, 5, 6, 7, 9] {
            rx.on_rtp(seq, 0, 0, 10);
        }
        let rb = rx.build_report_block(7, now);
        // expected 10, received 8
        assert_eq!(rb.cumulative_lost, 2);
        assert_eq!(rb.fraction_lost, (2 * 256 / 10) as u8);
        assert_eq!(rb.highest_seq_no_received, 9);

        for seq in 10u32..20 {
            rx.on_rtp(seq, 0, 0, 10);
        }
        let rb = rx.build_report_block(7, now);
        assert_eq!(rb.fraction_lost, 0);
        assert_eq!(rb.cumulative_lost, 2);
    }

    #[test]
    fn dlsr_measures_time_since_last_sr() {
        let mut rx = RxStats::default();
        rx.on_rtp(1, 0, 0, 1);
        let sr_ntp = NtpTime::new(0x0001_2345, 0x8000_0000);
        rx.on_sr_received(sr_ntp, NtpTime::from_unix(Duration::from_secs(10)));
        let rb = rx.build_report_block(1, NtpTime::from_unix(Duration::from_millis(12_500)));
        assert_eq!(rb.lsr, sr_ntp.compact());
        assert_eq!(rb.dlsr, (2 << 16) + (1 << 15));
    }
}
