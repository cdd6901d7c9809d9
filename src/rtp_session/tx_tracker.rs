use rand::{RngCore, rngs::OsRng};

use crate::rtp::{rtp_error::RtpError, rtp_header::RtpHeader, rtp_packet::RtpPacket};

/// Outbound sequence/timestamp state for the local source.
///
/// The values in the state always describe the *next* packet to send.
#[derive(Debug, Clone)]
pub struct TxTracker {
    ssrc: u32,
    seq: u16,
    ts: u32,
    packets: u32,
    octets: u32,
    /// Timestamp carried by the last packet the transport accepted.
    last_ts: Option<u32>,
}

impl TxTracker {
    /// Random initial sequence and timestamp (RFC3550 §5.1).
    pub fn new(ssrc: Option<u32>) -> Self {
        Self::with_initial(
            ssrc.unwrap_or_else(|| OsRng.next_u32()),
            (OsRng.next_u32() & 0xFFFF) as u16,
            OsRng.next_u32(),
        )
    }

    pub fn with_initial(ssrc: u32, seq: u16, ts: u32) -> Self {
        Self {
            ssrc,
            seq,
            ts,
            packets: 0,
            octets: 0,
            last_ts: None,
        }
    }

    /// Builds one packet and moves to the next: sequence by one, timestamp
    /// by `ts_len` samples. `ts_override` pins the header timestamp (used by
    /// telephone events) without changing how far the running timestamp moves.
    ///
    /// Counters are untouched until [`TxTracker::record_sent`].
    pub fn build(
        &mut self,
        payload: &[u8],
        marker: bool,
        pt: u8,
        ts_len: u32,
        ts_override: Option<u32>,
    ) -> Result<Vec<u8>, RtpError> {
        let ts = ts_override.unwrap_or(self.ts);
        let header = RtpHeader::new(pt, self.seq, ts, self.ssrc).with_marker(marker);
        let bytes = RtpPacket::new(header, payload.to_vec()).encode()?;

        self.seq = self.seq.wrapping_add(1);
        self.ts = self.ts.wrapping_add(ts_len);
        Ok(bytes)
    }

    /// Accounts a built packet once it has left through the transport.
    pub fn record_sent(&mut self, payload_len: usize, ts: u32) {
        self.packets = self.packets.wrapping_add(1);
        self.octets = self.octets.wrapping_add(payload_len as u32);
        self.last_ts = Some(ts);
    }

    /// Moves the timestamp baseline without sending anything.
    pub fn advance_timestamp(&mut self, samples: u32) {
        self.ts = self.ts.wrapping_add(samples);
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn next_seq(&self) -> u16 {
        self.seq
    }

    pub fn next_timestamp(&self) -> u32 {
        self.ts
    }

    pub fn last_timestamp(&self) -> Option<u32> {
        self.last_ts
    }

    pub fn packets(&self) -> u32 {
        self.packets
    }

    pub fn octets(&self) -> u32 {
        self.octets
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn each_frame_steps_seq_by_one_and_ts_by_samples() {
        let mut tx = TxTracker::with_initial(9, 65535, u32::MAX - 100);
        let a = RtpPacket::decode(&tx.build(&[0; 160], true, 0, 160, None).unwrap()).unwrap();
        let b = RtpPacket::decode(&tx.build(&[0; 160], false, 0, 160, None).unwrap()).unwrap();
        assert_eq!(a.header.sequence_number, 65535);
        assert_eq!(b.header.sequence_number, 0);
        assert_eq!(b.header.timestamp, a.header.timestamp.wrapping_add(160));
        assert!(a.header.marker);
        assert_eq!(tx.packets(), 0);
        tx.record_sent(160, a.header.timestamp);
        tx.record_sent(160, b.header.timestamp);
        assert_eq!(tx.packets(), 2);
        assert_eq!(tx.octets(), 320);
    }

    #[test]
    fn pinned_timestamp_still_advances_the_baseline() {
        let mut tx = TxTracker::with_initial(9, 10, 1000);
        let p = RtpPacket::decode(&tx.build(&[1, 2, 3, 4], true, 101, 160, Some(800)).unwrap())
            .unwrap();
        assert_eq!(p.header.timestamp, 800);
        assert_eq!(tx.next_timestamp(), 1160);
        assert_eq!(tx.last_timestamp(), None);
        tx.record_sent(4, p.header.timestamp);
        assert_eq!(tx.last_timestamp(), Some(800));
    }

    #[test]
    fn random_start_uses_configured_ssrc() {
        let tx = TxTracker::new(Some(0xABCD));
        assert_eq!(tx.ssrc(), 0xABCD);
    }
}
