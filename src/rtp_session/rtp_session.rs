use std::sync::Arc;

use super::{
    rtp_session_config::{DEFAULT_MAX_DROPOUT, RtpSessionConfig},
    rtp_session_error::RtpSessionError,
    rx_tracker::{RxDecision, RxTracker},
    tx_tracker::TxTracker,
};
use crate::{
    log::log_sink::LogSink,
    rtp::rtp_packet::RtpPacket,
    sink_debug, sink_trace, sink_warn,
};

/// Point-in-time view of both directions of the RTP session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpSessionInfo {
    pub local_ssrc: u32,
    pub tx_next_seq: u16,
    pub tx_next_timestamp: u32,
    pub tx_packets: u32,
    pub tx_octets: u32,
    pub remote_ssrc: Option<u32>,
    pub rx_highest_ext_seq: u32,
    pub rx_validated: bool,
    pub rx_duplicates: u64,
    pub rx_resyncs: u64,
    pub rx_discarded: u64,
    pub rx_malformed: u64,
}

/// Sequencing, timestamping and source validation for one stream.
pub struct RtpSession {
    tx: TxTracker,
    rx: RxTracker,
    malformed: u64,
    logger: Arc<dyn LogSink>,
}

impl RtpSession {
    /// An unset `max_dropout` falls back to [`DEFAULT_MAX_DROPOUT`].
    pub fn new(cfg: &RtpSessionConfig, logger: Arc<dyn LogSink>) -> Self {
        Self::with_tx(TxTracker::new(cfg.local_ssrc), cfg, logger)
    }

    pub fn with_tx(tx: TxTracker, cfg: &RtpSessionConfig, logger: Arc<dyn LogSink>) -> Self {
        Self {
            tx,
            rx: RxTracker::with_limits(
                cfg.probation,
                cfg.max_dropout_or(DEFAULT_MAX_DROPOUT),
                cfg.max_misorder,
                cfg.probation_limit,
            ),
            malformed: 0,
            logger,
        }
    }

    /// Wraps `payload` in a 12-byte header and advances the send state by
    /// one packet and `ts_len` samples.
    pub fn encode_header(
        &mut self,
        payload: &[u8],
        marker: bool,
        pt: u8,
        ts_len: u32,
    ) -> Result<Vec<u8>, RtpSessionError> {
        self.tx
            .build(payload, marker, pt, ts_len, None)
            .map_err(RtpSessionError::Encode)
    }

    /// Same as [`RtpSession::encode_header`] but the header carries `ts`
    /// instead of the running timestamp.
    pub fn encode_with_timestamp(
        &mut self,
        payload: &[u8],
        marker: bool,
        pt: u8,
        ts: u32,
        ts_len: u32,
    ) -> Result<Vec<u8>, RtpSessionError> {
        self.tx
            .build(payload, marker, pt, ts_len, Some(ts))
            .map_err(RtpSessionError::Encode)
    }

    /// Counts a packet built by this session after the transport took it.
    pub fn on_sent(&mut self, payload_len: usize, ts: u32) {
        self.tx.record_sent(payload_len, ts);
    }

    pub fn advance_timestamp(&mut self, samples: u32) {
        self.tx.advance_timestamp(samples);
    }

    /// Parse only; no state is touched.
    pub fn decode_header(bytes: &[u8]) -> Result<RtpPacket, RtpSessionError> {
        Ok(RtpPacket::decode(bytes)?)
    }

    /// Parses and validates an inbound datagram. Malformed packets are
    /// counted and returned as errors for the caller to drop.
    pub fn on_rx(&mut self, bytes: &[u8]) -> Result<(RtpPacket, RxDecision), RtpSessionError> {
        let pkt = match Self::decode_header(bytes) {
            Ok(pkt) => pkt,
            Err(e) => {
                self.malformed += 1;
                sink_debug!(self.logger, "[RTP] dropping malformed packet ({} bytes): {e}", bytes.len());
                return Err(e);
            }
        };
        let decision = self
            .rx
            .on_packet(pkt.header.ssrc, pkt.header.sequence_number);
        match decision {
            RxDecision::Resync { ext_seq, .. } => {
                sink_warn!(
                    self.logger,
                    "[RTP] resync on ssrc={:#010x} seq={} (ext={ext_seq})",
                    pkt.header.ssrc,
                    pkt.header.sequence_number
                );
            }
            RxDecision::Duplicate => {
                sink_trace!(self.logger, "[RTP] duplicate seq={}", pkt.header.sequence_number);
            }
            RxDecision::Discard => {
                sink_debug!(
                    self.logger,
                    "[RTP] discarding seq={} from ssrc={:#010x}",
                    pkt.header.sequence_number,
                    pkt.header.ssrc
                );
            }
            RxDecision::Accept { .. } => {}
        }
        Ok((pkt, decision))
    }

    pub fn local_ssrc(&self) -> u32 {
        self.tx.ssrc()
    }

    pub fn remote_ssrc(&self) -> Option<u32> {
        self.rx.ssrc()
    }

    pub fn tx(&self) -> &TxTracker {
        &self.tx
    }

    pub fn info(&self) -> RtpSessionInfo {
        RtpSessionInfo {
            local_ssrc: self.tx.ssrc(),
            tx_next_seq: self.tx.next_seq(),
            tx_next_timestamp: self.tx.next_timestamp(),
            tx_packets: self.tx.packets(),
            tx_octets: self.tx.octets(),
            remote_ssrc: self.rx.ssrc(),
            rx_highest_ext_seq: self.rx.highest_ext_seq(),
            rx_validated: self.rx.is_validated(),
            rx_duplicates: self.rx.duplicates(),
            rx_resyncs: self.rx.resyncs() + self.rx.source_changes(),
            rx_discarded: self.rx.discarded(),
            rx_malformed: self.malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;
    use crate::rtp::RtpError;

    fn session(ssrc: u32, seq: u16, ts: u32) -> RtpSession {
        RtpSession::with_tx(
            TxTracker::with_initial(ssrc, seq, ts),
            &RtpSessionConfig::default(),
            Arc::new(NoopLogSink),
        )
    }

    #[test]
    fn loopback_packets_validate_after_probation() {
        let mut a = session(0xA, 100, 5000);
        let mut b = session(0xB, 0, 0);

        let p1 = a.encode_header(&[1; 160], true, 0, 160).unwrap();
        let p2 = a.encode_header(&[2; 160], false, 0, 160).unwrap();

        let (pkt, d) = b.on_rx(&p1).unwrap();
        assert_eq!(pkt.header.timestamp, 5000);
        assert!(pkt.header.marker);
        assert_eq!(d, RxDecision::Accept { ext_seq: 100, validated: false });

        let (pkt, d) = b.on_rx(&p2).unwrap();
        assert_eq!(pkt.header.timestamp, 5160);
        assert_eq!(d, RxDecision::Accept { ext_seq: 101, validated: true });
        assert_eq!(b.remote_ssrc(), Some(0xA));
    }

    #[test]
    fn malformed_input_is_counted_and_rejected() {
        let mut b = session(0xB, 0, 0);
        assert!(matches!(
            b.on_rx(&[0x80, 0, 0]),
            Err(RtpSessionError::MalformedPacket(RtpError::TooShort))
        ));
        let mut bad_version = [0u8; 12];
        bad_version[0] = 0x40;
        assert!(matches!(
            b.on_rx(&bad_version),
            Err(RtpSessionError::MalformedPacket(RtpError::BadVersion(1)))
        ));
        assert_eq!(b.info().rx_malformed, 2);
    }

    #[test]
    fn advance_timestamp_moves_next_header() {
        let mut a = session(0xA, 1, 1000);
        a.advance_timestamp(800);
        let p = RtpSession::decode_header(&a.encode_header(&[], false, 0, 160).unwrap()).unwrap();
        assert_eq!(p.header.timestamp, 1800);
        assert_eq!(a.info().tx_next_timestamp, 1960);
    }
}
