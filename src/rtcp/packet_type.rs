use super::{common_header::CommonHeader, rtcp::RtcpPacket, rtcp_error::RtcpError};

// RTCP packet types (RFC3550)
pub const PT_SR: u8 = 200;
pub const PT_RR: u8 = 201;
pub const PT_SDES: u8 = 202;
pub const PT_BYE: u8 = 203;
pub const PT_APP: u8 = 204;

pub trait RtcpPacketType {
    /// Encodes the full packet, common header included.
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError>;

    /// Decodes the packet body that follows `hdr`.
    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError>;
}

/// Patches the length field of the packet that started at `start`. The body
/// must already be word aligned.
pub(crate) fn finish_packet(out: &mut [u8], start: usize) {
    let total = out.len() - start;
    let len_words = (total / 4).saturating_sub(1) as u16;
    out[start + 2..start + 4].copy_from_slice(&len_words.to_be_bytes());
}

pub(crate) fn pad_to_word(out: &mut Vec<u8>, start: usize) {
    let pad = (4 - (out.len() - start) % 4) % 4;
    out.resize(out.len() + pad, 0);
}
