use super::{config::RTP_HEADER_LEN, rtp_header_extension::RtpHeaderExtension};

/// Header fields that vary per packet. Version is always 2 on the wire and
/// the P/X bits are derived from the packet's padding and `extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeader {
    pub marker: bool,
    /// 7 bits.
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrcs: Vec<u32>,
    pub extension: Option<RtpHeaderExtension>,
}

impl RtpHeader {
    pub fn new(payload_type: u8, sequence_number: u16, timestamp: u32, ssrc: u32) -> Self {
        Self {
            marker: false,
            payload_type: payload_type & 0x7F,
            sequence_number,
            timestamp,
            ssrc,
            csrcs: Vec::new(),
            extension: None,
        }
    }

    pub fn with_marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_csrcs(mut self, csrcs: Vec<u32>) -> Self {
        self.csrcs = csrcs;
        self
    }

    pub fn with_extension(mut self, ext: Option<RtpHeaderExtension>) -> Self {
        self.extension = ext;
        self
    }

    /// Bytes before the payload: fixed part, CSRCs and extension.
    pub fn encoded_len(&self) -> usize {
        RTP_HEADER_LEN
            + self.csrcs.len() * 4
            + self
                .extension
                .as_ref()
                .map_or(0, RtpHeaderExtension::encoded_len)
    }
}
