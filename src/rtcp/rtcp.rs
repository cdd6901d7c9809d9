use super::{
    bye::Bye,
    common_header::CommonHeader,
    packet_type::{PT_APP, PT_BYE, PT_RR, PT_SDES, PT_SR, RtcpPacketType},
    receiver_report::ReceiverReport,
    rtcp_error::RtcpError,
    sdes::Sdes,
    sender_report::SenderReport,
};

/// The union of supported RTCP packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcpPacket {
    Sr(SenderReport),
    Rr(ReceiverReport),
    Sdes(Sdes),
    Bye(Bye),
}

impl RtcpPacket {
    /// Decode a *compound* RTCP buffer into individual packets.
    ///
    /// Packet types this crate does not model (APP, feedback) are skipped
    /// using their length field. A compound must start with SR or RR.
    pub fn decode_compound(buf: &[u8]) -> Result<Vec<RtcpPacket>, RtcpError> {
        let mut out = Vec::new();
        let mut idx = 0usize;
        while idx < buf.len() {
            let (hdr, total) = CommonHeader::decode(&buf[idx..])?;
            if idx == 0 && hdr.pt() != PT_SR && hdr.pt() != PT_RR {
                return Err(RtcpError::NotAReport(hdr.pt()));
            }
            let body = hdr.body(&buf[idx..idx + total])?;

            let pkt = match hdr.pt() {
                PT_SR => Some(SenderReport::decode(&hdr, body)?),
                PT_RR => Some(ReceiverReport::decode(&hdr, body)?),
                PT_SDES => Some(Sdes::decode(&hdr, body)?),
                PT_BYE => Some(Bye::decode(&hdr, body)?),
                _ => None,
            };
            out.extend(pkt);
            idx += total;
        }
        if out.is_empty() {
            return Err(RtcpError::TooShort);
        }
        Ok(out)
    }

    /// Encode a compound RTCP packet (concatenation of packets).
    pub fn encode_compound(pkts: &[RtcpPacket]) -> Result<Vec<u8>, RtcpError> {
        let mut out = Vec::new();
        for pkt in pkts {
            match pkt {
                RtcpPacket::Sr(sr) => sr.encode_into(&mut out)?,
                RtcpPacket::Rr(rr) => rr.encode_into(&mut out)?,
                RtcpPacket::Sdes(sdes) => sdes.encode_into(&mut out)?,
                RtcpPacket::Bye(bye) => bye.encode_into(&mut out)?,
            }
        }
        Ok(out)
    }
}

/// RTP/RTCP demux on a shared port (RFC 5761 §4): RTCP packet types
/// 200..=204 fall in a range RTP payload types with the marker bit never use
/// for audio.
pub fn is_rtcp(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && (PT_SR..=PT_APP).contains(&bytes[1])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::rtcp::{report_block::ReportBlock, sender_info::SenderInfo};
    use crate::rtp::time::NtpTime;

    fn sample_compound() -> Vec<RtcpPacket> {
        let rb = ReportBlock {
            ssrc: 0xB,
            fraction_lost: 64,
            cumulative_lost: 12,
            highest_seq_no_received: 70_000,
            interarrival_jitter: 33,
            lsr: 0x1234_5678,
            dlsr: 0x0001_0000,
        };
        let info = SenderInfo {
            ntp: NtpTime::new(10, 20),
            rtp_ts: 160,
            packet_count: 50,
            octet_count: 8000,
        };
        vec![
            RtcpPacket::Sr(SenderReport::new(0xA, info, vec![rb])),
            RtcpPacket::Sdes(Sdes::cname(0xA, "alice@example")),
            RtcpPacket::Bye(Bye::single(0xA, Some("hangup".into()))),
        ]
    }

    #[test]
    fn compound_is_word_aligned_and_decodes_back() {
        let pkts = sample_compound();
        let bytes = RtcpPacket::encode_compound(&pkts).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert!(is_rtcp(&bytes));
        assert_eq!(RtcpPacket::decode_compound(&bytes).unwrap(), pkts);
    }

    #[test]
    fn unknown_packet_types_are_skipped() {
        let mut bytes =
            RtcpPacket::encode_compound(&[RtcpPacket::Rr(ReceiverReport::new(1, vec![]))]).unwrap();
        // APP packet: header + ssrc + name
        bytes.extend_from_slice(&[0x80, PT_APP, 0x00, 0x02, 0, 0, 0, 1, b'T', b'E', b'S', b'T']);
        let pkts = RtcpPacket::decode_compound(&bytes).unwrap();
        assert_eq!(pkts, vec![RtcpPacket::Rr(ReceiverReport::new(1, vec![]))]);
    }

    #[test]
    fn compound_must_start_with_report() {
        let bytes = RtcpPacket::encode_compound(&[RtcpPacket::Sdes(Sdes::cname(1, "x"))]).unwrap();
        assert_eq!(
            RtcpPacket::decode_compound(&bytes),
            Err(RtcpError::NotAReport(PT_SDES))
        );
    }

    #[test]
    fn truncated_compound_fails() {
        let bytes = RtcpPacket::encode_compound(&sample_compound()).unwrap();
        assert!(RtcpPacket::decode_compound(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn rtp_is_not_mistaken_for_rtcp() {
        // PCMU with marker bit: second byte 0x80
        assert!(!is_rtcp(&[0x80, 0x80, 0, 1]));
        // telephone-event pt 101 with marker: 0xE5
        assert!(!is_rtcp(&[0x80, 0xE5, 0, 1]));
        assert!(is_rtcp(&[0x80, PT_RR, 0, 1]));
    }
}
