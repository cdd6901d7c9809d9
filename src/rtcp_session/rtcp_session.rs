use std::sync::Arc;

use super::{
    rtcp_session_config::RtcpSessionConfig,
    rtcp_stat::{RtcpStat, RxStreamStat, TxStreamStat},
    rx_stats::RxStats,
    tx_stats::TxStats,
};
use crate::{
    jitter_buffer::JbFrame,
    log::log_sink::LogSink,
    rtcp::{
        RtcpError, RtcpPacket, bye::Bye, receiver_report::ReceiverReport,
        report_block::ReportBlock, sdes::Sdes, sender_info::SenderInfo,
        sender_report::SenderReport,
    },
    rtp::time::NtpTime,
    sink_debug, sink_info, sink_trace,
};

/// Quality statistics for both directions and RTCP report construction
/// and parsing for one stream.
pub struct RtcpSession {
    ssrc: u32,
    cname: String,
    clock_rate: u32,
    remote_ssrc: Option<u32>,

    rx: RxStats,
    tx: TxStats,

    frames_played: u64,
    frames_concealed: u64,
    frames_silent: u64,
    sr_sent: u64,
    rr_sent: u64,
    rtcp_received: u64,
    rtcp_malformed: u64,
    bye_reason: Option<Option<String>>,
    remote_cname: Option<String>,

    logger: Arc<dyn LogSink>,
}

impl RtcpSession {
    pub fn new(ssrc: u32, clock_rate: u32, cfg: &RtcpSessionConfig, logger: Arc<dyn LogSink>) -> Self {
        Self {
            ssrc,
            cname: cfg.cname.clone(),
            clock_rate,
            remote_ssrc: None,
            rx: RxStats::default(),
            tx: TxStats::default(),
            frames_played: 0,
            frames_concealed: 0,
            frames_silent: 0,
            sr_sent: 0,
            rr_sent: 0,
            rtcp_received: 0,
            rtcp_malformed: 0,
            bye_reason: None,
            remote_cname: None,
            logger,
        }
    }

    /// Validated inbound RTP packet. `arrival` is the media clock at
    /// reception, in RTP clock units.
    pub fn on_rx_rtp(&mut self, ssrc: u32, ext_seq: u32, timestamp: u32, arrival: u32, payload_len: usize) {
        if self.remote_ssrc != Some(ssrc) {
            self.remote_ssrc = Some(ssrc);
            self.rx.restart();
        }
        self.rx.on_rtp(ext_seq, timestamp, arrival, payload_len);
    }

    /// The RTP session reset its sequence baseline.
    pub fn restart_rx(&mut self) {
        self.rx.restart();
    }

    pub fn on_tx_rtp(&mut self, payload_len: usize, timestamp: u32) {
        self.tx.on_rtp(payload_len, timestamp);
    }

    /// Outcome of one playout pull.
    pub fn on_playout(&mut self, frame: JbFrame) {
        match frame {
            JbFrame::Frame { .. } => self.frames_played += 1,
            JbFrame::Missing { .. } => self.frames_concealed += 1,
            JbFrame::Skipped { .. } | JbFrame::NotReady | JbFrame::Empty => {
                self.frames_silent += 1
            }
        }
    }

    /// SR when we sent media since the last report, RR otherwise.
    fn report_packet(&mut self, now: NtpTime) -> RtcpPacket {
        let reports: Vec<ReportBlock> = match self.remote_ssrc {
            Some(remote) if self.rx.has_data() => vec![self.rx.build_report_block(remote, now)],
            _ => Vec::new(),
        };

        if self.tx.sent_since_report > 0 {
            self.tx.sent_since_report = 0;
            self.tx.mark_sr_sent(now);
            self.sr_sent += 1;
            let info = SenderInfo {
                ntp: now,
                rtp_ts: self.tx.last_rtp_ts,
                packet_count: self.tx.packets as u32,
                octet_count: self.tx.octets as u32,
            };
            RtcpPacket::Sr(SenderReport::new(self.ssrc, info, reports))
        } else {
            self.rr_sent += 1;
            RtcpPacket::Rr(ReceiverReport::new(self.ssrc, reports))
        }
    }

    fn sdes_packet(&self) -> RtcpPacket {
        RtcpPacket::Sdes(Sdes::cname(self.ssrc, self.cname.clone()))
    }

    /// Periodic compound report: SR or RR followed by SDES CNAME.
    pub fn build_report(&mut self, now: NtpTime) -> Result<Vec<u8>, RtcpError> {
        let report = self.report_packet(now);
        sink_trace!(self.logger, "[RTCP] report: {report:?}");
        RtcpPacket::encode_compound(&[report, self.sdes_packet()])
    }

    /// Report plus SDES, sent on demand.
    pub fn build_sdes(&mut self, now: NtpTime) -> Result<Vec<u8>, RtcpError> {
        self.build_report(now)
    }

    /// Report, SDES and BYE for our source.
    pub fn build_bye(&mut self, now: NtpTime, reason: Option<&str>) -> Result<Vec<u8>, RtcpError> {
        let report = self.report_packet(now);
        let bye = RtcpPacket::Bye(Bye::single(self.ssrc, reason.map(str::to_string)));
        RtcpPacket::encode_compound(&[report, self.sdes_packet(), bye])
    }

    /// Parses an inbound compound packet received at `now`.
    pub fn on_rx_rtcp(&mut self, bytes: &[u8], now: NtpTime) -> Result<(), RtcpError> {
        let packets = match RtcpPacket::decode_compound(bytes) {
            Ok(p) => p,
            Err(e) => {
                self.rtcp_malformed += 1;
                sink_debug!(self.logger, "[RTCP] dropping malformed compound ({} bytes): {e}", bytes.len());
                return Err(e);
            }
        };
        self.rtcp_received += 1;

        for pkt in packets {
            match pkt {
                RtcpPacket::Sr(sr) => {
                    self.rx.on_sr_received(sr.info.ntp, now);
                    self.on_report_blocks(&sr.reports, now);
                }
                RtcpPacket::Rr(rr) => self.on_report_blocks(&rr.reports, now),
                RtcpPacket::Sdes(sdes) => {
                    let cname = match self.remote_ssrc {
                        Some(remote) => sdes.cname_of(remote),
                        None => sdes.chunks.first().and_then(|c| sdes.cname_of(c.ssrc)),
                    };
                    if let Some(cname) = cname {
                        self.remote_cname = Some(cname.to_string());
                    }
                }
                RtcpPacket::Bye(bye) => {
                    sink_info!(
                        self.logger,
                        "[RTCP] BYE from {:?} reason={:?}",
                        bye.sources,
                        bye.reason
                    );
                    self.bye_reason = Some(bye.reason);
                }
            }
        }
        Ok(())
    }

    fn on_report_blocks(&mut self, reports: &[ReportBlock], now: NtpTime) {
        for rb in reports.iter().filter(|rb| rb.ssrc == self.ssrc) {
            self.tx.on_report_block(rb, now);
        }
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn stat(&self) -> RtcpStat {
        let jitter = self.rx.jitter();
        RtcpStat {
            rx: RxStreamStat {
                packets: self.rx.packets(),
                octets: self.rx.octets(),
                expected: self.rx.expected(),
                cumulative_lost: self.rx.cumulative_lost(),
                fraction_lost: self.rx.last_fraction_lost(),
                highest_ext_seq: self.rx.highest_ext_seq(),
                jitter,
                jitter_ms: if self.clock_rate == 0 {
                    0.0
                } else {
                    jitter * 1000.0 / f64::from(self.clock_rate)
                },
                frames_played: self.frames_played,
                frames_concealed: self.frames_concealed,
                frames_silent: self.frames_silent,
            },
            tx: TxStreamStat {
                packets: self.tx.packets,
                octets: self.tx.octets,
                remote_fraction_lost: self.tx.remote_fraction_lost,
                remote_cumulative_lost: self.tx.remote_cum_lost,
                remote_highest_ext_seq: self.tx.remote_highest_ext_seq,
                remote_jitter: self.tx.remote_jitter,
            },
            rtt: self.tx.rtt,
            sr_sent: self.sr_sent,
            rr_sent: self.rr_sent,
            rtcp_received: self.rtcp_received,
            rtcp_malformed: self.rtcp_malformed,
            bye_received: self.bye_reason.is_some(),
            bye_reason: self.bye_reason.clone().flatten(),
            remote_cname: self.remote_cname.clone(),
        }
    }

    /// Clears counters. Sequence tracking, jitter and report timing keep going.
    pub fn reset_stat(&mut self) {
        self.rx.reset_counters();
        self.tx.packets = 0;
        self.tx.octets = 0;
        self.frames_played = 0;
        self.frames_concealed = 0;
        self.frames_silent = 0;
        self.sr_sent = 0;
        self.rr_sent = 0;
        self.rtcp_received = 0;
        self.rtcp_malformed = 0;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;
    use crate::rtcp::packet_type::{PT_BYE, PT_RR, PT_SR};
    use std::time::Duration;

    fn session(ssrc: u32) -> RtcpSession {
        RtcpSession::new(ssrc, 8000, &RtcpSessionConfig::default(), Arc::new(NoopLogSink))
    }

    fn at(ms: u64) -> NtpTime {
        NtpTime::from_unix(Duration::from_millis(ms))
    }

    #[test]
    fn sender_report_only_after_sending() {
        let mut s = session(1);
        let rr = s.build_report(at(0)).unwrap();
        assert_eq!(rr[1], PT_RR);

        s.on_tx_rtp(160, 1000);
        let sr = s.build_report(at(5000)).unwrap();
        assert_eq!(sr[1], PT_SR);
        match &RtcpPacket::decode_compound(&sr).unwrap()[..] {
            [RtcpPacket::Sr(sr), RtcpPacket::Sdes(sdes)] => {
                assert_eq!(sr.info.packet_count, 1);
                assert_eq!(sr.info.octet_count, 160);
                assert_eq!(sr.info.rtp_ts, 1000);
                assert_eq!(sdes.cname_of(1), Some("rustystream@localhost"));
            }
            other => panic!("unexpected compound {other:?}"),
        }

        // nothing sent since: back to RR
        assert_eq!(s.build_report(at(10_000)).unwrap()[1], PT_RR);
        assert_eq!((s.stat().sr_sent, s.stat().rr_sent), (1, 2));
    }

    #[test]
    fn report_block_describes_remote_source() {
        let mut s = session(1);
        for (i, seq) in [100u32, 101, 103].iter().enumerate() {
            s.on_rx_rtp(0xB, *seq, *seq * 160, i as u32 * 160, 160);
        }
        let bytes = s.build_report(at(0)).unwrap();
        let pkts = RtcpPacket::decode_compound(&bytes).unwrap();
        let RtcpPacket::Rr(rr) = &pkts[0] else {
            panic!("expected RR");
        };
        let rb = &rr.reports[0];
        assert_eq!(rb.ssrc, 0xB);
        assert_eq!(rb.highest_seq_no_received, 103);
        assert_eq!(rb.cumulative_lost, 1);
        assert_eq!(rb.fraction_lost, 64);
    }

    #[test]
    fn round_trip_from_sr_and_returned_report_block() {
        let mut a = session(0xA);
        let mut b = session(0xB);

        a.on_tx_rtp(160, 0);
        b.on_rx_rtp(0xA, 1, 0, 0, 160);

        // A sends SR at t=100s, B receives it 50ms later
        let sr = a.build_report(at(100_000)).unwrap();
        b.on_rx_rtcp(&sr, at(100_050)).unwrap();
        // B answers 200ms later, A receives it 50ms after that
        let rr = b.build_report(at(100_250)).unwrap();
        a.on_rx_rtcp(&rr, at(100_300)).unwrap();

        let rtt = a.stat().rtt.unwrap();
        let diff = rtt.as_secs_f64() - 0.100;
        assert!(diff.abs() < 0.001, "rtt={rtt:?}");
        assert_eq!(a.stat().remote_cname.as_deref(), Some("rustystream@localhost"));
    }

    #[test]
    fn bye_is_recorded() {
        let mut a = session(0xA);
        let mut b = session(0xB);
        let bye = a.build_bye(at(0), Some("done")).unwrap();
        let pkts = RtcpPacket::decode_compound(&bye).unwrap();
        assert!(matches!(pkts.last(), Some(RtcpPacket::Bye(_))));
        assert!(bye.windows(2).any(|w| w[1] == PT_BYE && w[0] & 0xC0 == 0x80));

        b.on_rx_rtcp(&bye, at(1)).unwrap();
        let stat = b.stat();
        assert!(stat.bye_received);
        assert_eq!(stat.bye_reason.as_deref(), Some("done"));
    }

    #[test]
    fn malformed_rtcp_is_counted() {
        let mut s = session(1);
        assert!(s.on_rx_rtcp(&[0x80, PT_RR, 0, 7], at(0)).is_err());
        assert_eq!(s.stat().rtcp_malformed, 1);
        assert_eq!(s.stat().rtcp_received, 0);
    }

    #[test]
    fn playout_outcomes_are_counted() {
        let mut s = session(1);
        s.on_playout(JbFrame::Frame { seq: 1, timestamp: 0 });
        s.on_playout(JbFrame::Missing { seq: 2 });
        s.on_playout(JbFrame::NotReady);
        let rx = s.stat().rx;
        assert_eq!((rx.frames_played, rx.frames_concealed, rx.frames_silent), (1, 1, 1));
        s.reset_stat();
        assert_eq!(s.stat().rx.frames_played, 0);
    }
}
