use super::{config::RTCP_VERSION, rtcp_error::RtcpError};

/// The 32-bit word that opens every RTCP packet:
/// `V=2 | P | count(5) | PT(8) | length(16)`.
///
/// Length is kept as the wire value (words minus one); encoders write zero
/// and let `finish_packet` patch it once the body is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonHeader {
    padded: bool,
    count: u8,
    pt: u8,
    length_words: u16,
}

impl CommonHeader {
    pub fn new(count: u8, pt: u8) -> Self {
        Self {
            padded: false,
            count: count & 0x1F,
            pt,
            length_words: 0,
        }
    }

    /// Parses the first word of `buf`. Returns the header and the size in
    /// bytes of the whole packet it announces.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), RtcpError> {
        let [b0, pt, l0, l1, ..] = *buf else {
            return Err(RtcpError::TooShort);
        };
        if b0 >> 6 != RTCP_VERSION {
            return Err(RtcpError::BadVersion(b0 >> 6));
        }
        let length_words = u16::from_be_bytes([l0, l1]);
        let size = 4 * (usize::from(length_words) + 1);
        if size > buf.len() {
            return Err(RtcpError::Truncated);
        }
        let hdr = Self {
            padded: b0 & 0x20 != 0,
            count: b0 & 0x1F,
            pt,
            length_words,
        };
        Ok((hdr, size))
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push((RTCP_VERSION << 6) | (u8::from(self.padded) << 5) | self.count);
        out.push(self.pt);
        out.extend_from_slice(&self.length_words.to_be_bytes());
    }

    /// Everything after the header word, minus trailing padding when P is set.
    pub fn body<'a>(&self, packet: &'a [u8]) -> Result<&'a [u8], RtcpError> {
        let body = packet.get(4..).ok_or(RtcpError::TooShort)?;
        if !self.padded {
            return Ok(body);
        }
        match body.last().map(|&n| usize::from(n)) {
            Some(n) if n > 0 && n <= body.len() => Ok(&body[..body.len() - n]),
            _ => Err(RtcpError::Truncated),
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn pt(&self) -> u8 {
        self.pt
    }
}
