use super::{
    common_header::CommonHeader,
    config::{MAX_RC, REPORT_BLOCK_LEN, SENDER_INFO_LEN},
    packet_type::{PT_SR, RtcpPacketType, finish_packet, pad_to_word},
    report_block::ReportBlock,
    rtcp::RtcpPacket,
    rtcp_error::RtcpError,
    sender_info::SenderInfo,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SenderReport {
    pub ssrc: u32,
    pub info: SenderInfo,
    pub reports: Vec<ReportBlock>,
}

impl SenderReport {
    pub fn new(ssrc: u32, info: SenderInfo, reports: Vec<ReportBlock>) -> Self {
        Self {
            ssrc,
            info,
            reports,
        }
    }
}

impl RtcpPacketType for SenderReport {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.reports.len() > MAX_RC {
            return Err(RtcpError::TooManyReportBlocks(self.reports.len()));
        }
        let start = out.len();
        CommonHeader::new(self.reports.len() as u8, PT_SR).encode_into(out);
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        self.info.encode_into(out);
        for rb in &self.reports {
            rb.encode_into(out);
        }
        pad_to_word(out, start);
        finish_packet(out, start);
        Ok(())
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        if payload.len() < 4 + SENDER_INFO_LEN {
            return Err(RtcpError::Truncated);
        }
        let ssrc = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let info = SenderInfo::decode(&payload[4..])?;
        let reports = decode_blocks(hdr.count(), &payload[4 + SENDER_INFO_LEN..])?;
        Ok(RtcpPacket::Sr(SenderReport {
            ssrc,
            info,
            reports,
        }))
    }
}

/// Reads `count` report blocks; any trailing profile extension is ignored.
pub(crate) fn decode_blocks(count: u8, buf: &[u8]) -> Result<Vec<ReportBlock>, RtcpError> {
    let count = usize::from(count);
    if buf.len() < count * REPORT_BLOCK_LEN {
        return Err(RtcpError::Truncated);
    }
    buf.chunks_exact(REPORT_BLOCK_LEN)
        .take(count)
        .map(ReportBlock::decode)
        .collect()
}
