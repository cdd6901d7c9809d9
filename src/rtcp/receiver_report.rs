use super::{
    common_header::CommonHeader,
    config::MAX_RC,
    packet_type::{PT_RR, RtcpPacketType, finish_packet, pad_to_word},
    report_block::ReportBlock,
    rtcp::RtcpPacket,
    rtcp_error::RtcpError,
    sender_report::decode_blocks,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiverReport {
    pub ssrc: u32,
    pub reports: Vec<ReportBlock>,
}

impl ReceiverReport {
    pub fn new(ssrc: u32, reports: Vec<ReportBlock>) -> Self {
        Self { ssrc, reports }
    }
}

impl RtcpPacketType for ReceiverReport {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.reports.len() > MAX_RC {
            return Err(RtcpError::TooManyReportBlocks(self.reports.len()));
        }
        let start = out.len();
        CommonHeader::new(self.reports.len() as u8, PT_RR).encode_into(out);
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        for rb in &self.reports {
            rb.encode_into(out);
        }
        pad_to_word(out, start);
        finish_packet(out, start);
        Ok(())
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        if payload.len() < 4 {
            return Err(RtcpError::Truncated);
        }
        let ssrc = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let reports = decode_blocks(hdr.count(), &payload[4..])?;
        Ok(RtcpPacket::Rr(ReceiverReport { ssrc, reports }))
    }
}
