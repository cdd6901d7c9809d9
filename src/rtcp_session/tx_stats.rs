use std::time::Duration;

use crate::rtcp::report_block::ReportBlock;
use crate::rtp::time::{NtpTime, compact_to_duration};

/// Send-side counters plus what the remote reports about our stream.
#[derive(Debug, Clone, Default)]
pub struct TxStats {
    pub packets: u64,
    pub octets: u64,
    /// RTP timestamp of the last packet sent; goes into the SR.
    pub last_rtp_ts: u32,
    /// Packets sent since the last report; selects SR over RR.
    pub sent_since_report: u32,

    /// Compact NTP of the last SR we sent, matched against remote LSR.
    pub last_sr_compact: u32,

    // Remote-reported stats about our outbound stream
    pub remote_fraction_lost: u8,
    pub remote_cum_lost: i32,
    pub remote_highest_ext_seq: u32,
    pub remote_jitter: u32,

    /// RFC3550 A.8 round trip, from the latest usable report block.
    pub rtt: Option<Duration>,
}

impl TxStats {
    pub fn on_rtp(&mut self, payload_len: usize, rtp_ts: u32) {
        self.packets += 1;
        self.octets += payload_len as u64;
        self.last_rtp_ts = rtp_ts;
        self.sent_since_report = self.sent_since_report.saturating_add(1);
    }

    pub fn mark_sr_sent(&mut self, ntp: NtpTime) {
        self.last_sr_compact = ntp.compact();
    }

    /// Consume a report block about our SSRC, received at `arrival`.
    pub fn on_report_block(&mut self, rb: &ReportBlock, arrival: NtpTime) {
        self.remote_fraction_lost = rb.fraction_lost;
        self.remote_cum_lost = rb.cumulative_lost;
        self.remote_highest_ext_seq = rb.highest_seq_no_received;
        self.remote_jitter = rb.interarrival_jitter;

        // RTT = A - LSR - DLSR (mod 2^32), in units of 1/65536 s
        if rb.lsr != 0 && rb.lsr == self.last_sr_compact {
            let rtt_units = arrival
                .compact()
                .wrapping_sub(rb.lsr)
                .wrapping_sub(rb.dlsr);
            // a negative result means clocks or DLSR are off; ignore it
            if (rtt_units as i32) >= 0 {
                self.rtt = Some(compact_to_duration(rtt_units));
            }
        }
    }
}
