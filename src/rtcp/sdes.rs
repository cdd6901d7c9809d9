use super::{
    common_header::CommonHeader,
    config::MAX_RC,
    packet_type::{PT_SDES, RtcpPacketType, finish_packet, pad_to_word},
    rtcp::RtcpPacket,
    rtcp_error::RtcpError,
};

const SDES_END: u8 = 0;
const SDES_CNAME: u8 = 1;
const SDES_NAME: u8 = 2;
const SDES_TOOL: u8 = 6;
const SDES_NOTE: u8 = 7;

/// SDES items the stream produces or reads. Everything else is kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdesItem {
    Cname(String),
    Name(String),
    Tool(String),
    Note(String),
    Other(u8, Vec<u8>),
}

impl SdesItem {
    fn parts(&self) -> (u8, &[u8]) {
        match self {
            SdesItem::Cname(s) => (SDES_CNAME, s.as_bytes()),
            SdesItem::Name(s) => (SDES_NAME, s.as_bytes()),
            SdesItem::Tool(s) => (SDES_TOOL, s.as_bytes()),
            SdesItem::Note(s) => (SDES_NOTE, s.as_bytes()),
            SdesItem::Other(t, v) => (*t, v.as_slice()),
        }
    }

    fn from_parts(typ: u8, data: &[u8]) -> Self {
        let text = || String::from_utf8_lossy(data).into_owned();
        match typ {
            SDES_CNAME => SdesItem::Cname(text()),
            SDES_NAME => SdesItem::Name(text()),
            SDES_TOOL => SdesItem::Tool(text()),
            SDES_NOTE => SdesItem::Note(text()),
            other => SdesItem::Other(other, data.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SdesChunk {
    pub ssrc: u32,
    pub items: Vec<SdesItem>,
}

impl SdesChunk {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        let start = out.len();
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        for item in &self.items {
            let (t, data) = item.parts();
            let len = u8::try_from(data.len()).map_err(|_| RtcpError::SdesItemTooLong)?;
            out.push(t);
            out.push(len);
            out.extend_from_slice(data);
        }
        // END plus null padding up to the next word
        out.push(SDES_END);
        pad_to_word(out, start);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize), RtcpError> {
        if buf.len() < 4 {
            return Err(RtcpError::Truncated);
        }
        let ssrc = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let mut idx = 4usize;
        let mut items = Vec::new();

        loop {
            let Some(&t) = buf.get(idx) else {
                return Err(RtcpError::Truncated);
            };
            idx += 1;
            if t == SDES_END {
                idx += (4 - idx % 4) % 4;
                if idx > buf.len() {
                    return Err(RtcpError::Truncated);
                }
                break;
            }
            let Some(&len) = buf.get(idx) else {
                return Err(RtcpError::SdesItemTooShort);
            };
            idx += 1;
            let len = usize::from(len);
            if buf.len() < idx + len {
                return Err(RtcpError::SdesItemTooShort);
            }
            items.push(SdesItem::from_parts(t, &buf[idx..idx + len]));
            idx += len;
        }

        Ok((Self { ssrc, items }, idx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sdes {
    pub chunks: Vec<SdesChunk>,
}

impl Sdes {
    pub fn cname(ssrc: u32, cname: impl Into<String>) -> Self {
        Self {
            chunks: vec![SdesChunk {
                ssrc,
                items: vec![SdesItem::Cname(cname.into())],
            }],
        }
    }

    /// CNAME announced for `ssrc`, if any chunk carries one.
    pub fn cname_of(&self, ssrc: u32) -> Option<&str> {
        self.chunks
            .iter()
            .filter(|c| c.ssrc == ssrc)
            .flat_map(|c| c.items.iter())
            .find_map(|item| match item {
                SdesItem::Cname(s) => Some(s.as_str()),
                _ => None,
            })
    }
}

impl RtcpPacketType for Sdes {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.chunks.len() > MAX_RC {
            return Err(RtcpError::TooManyReportBlocks(self.chunks.len()));
        }
        let start = out.len();
        CommonHeader::new(self.chunks.len() as u8, PT_SDES).encode_into(out);
        for ch in &self.chunks {
            ch.encode_into(out)?;
        }
        finish_packet(out, start);
        Ok(())
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        let mut chunks = Vec::with_capacity(usize::from(hdr.count()));
        let mut idx = 0usize;
        for _ in 0..hdr.count() {
            let (chunk, used) = SdesChunk::decode(&payload[idx..])?;
            chunks.push(chunk);
            idx += used;
        }
        Ok(RtcpPacket::Sdes(Sdes { chunks }))
    }
}
