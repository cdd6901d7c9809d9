use super::{
    common_header::CommonHeader,
    config::MAX_RC,
    packet_type::{PT_BYE, RtcpPacketType, finish_packet, pad_to_word},
    rtcp::RtcpPacket,
    rtcp_error::RtcpError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bye {
    pub sources: Vec<u32>,
    pub reason: Option<String>,
}

impl Bye {
    pub fn single(ssrc: u32, reason: Option<String>) -> Self {
        Self {
            sources: vec![ssrc],
            reason,
        }
    }
}

impl RtcpPacketType for Bye {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.sources.len() > MAX_RC {
            return Err(RtcpError::TooManyByeSources(self.sources.len()));
        }
        let start = out.len();
        CommonHeader::new(self.sources.len() as u8, PT_BYE).encode_into(out);
        for ssrc in &self.sources {
            out.extend_from_slice(&ssrc.to_be_bytes());
        }
        if let Some(reason) = &self.reason {
            // reason is truncated to what the 8-bit length can describe
            let rbytes = reason.as_bytes();
            let len = rbytes.len().min(usize::from(u8::MAX));
            out.push(len as u8);
            out.extend_from_slice(&rbytes[..len]);
        }
        pad_to_word(out, start);
        finish_packet(out, start);
        Ok(())
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        let sc = usize::from(hdr.count());
        if payload.len() < sc * 4 {
            return Err(RtcpError::Truncated);
        }
        let sources = payload[..sc * 4]
            .chunks_exact(4)
            .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
            .collect();
        let rest = &payload[sc * 4..];
        let reason = match rest.split_first() {
            Some((&len, text)) if len > 0 => {
                let len = usize::from(len);
                if text.len() < len {
                    return Err(RtcpError::Truncated);
                }
                Some(String::from_utf8_lossy(&text[..len]).into_owned())
            }
            _ => None,
        };
        Ok(RtcpPacket::Bye(Bye { sources, reason }))
    }
}
