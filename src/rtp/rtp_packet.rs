//! Minimal RTP packet model + encode/decode per RFC 3550.
//! This module has **no** session logic (no jitter calc, no validation).
//! It focuses on the packet struct and safe serialization.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{
    config::{MAX_CSRC_COUNT, RTP_HEADER_LEN, RTP_VERSION},
    rtp_error::RtpError,
    rtp_header::RtpHeader,
    rtp_header_extension::RtpHeaderExtension,
};

/// Complete RTP packet (header + payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub header: RtpHeader,
    /// Payload without any trailing padding bytes. If padding was present,
    /// use `padding_bytes` to know how much was removed during decode.
    pub payload: Vec<u8>,
    /// Count of padding bytes (from the last byte) if the P bit was set.
    pub padding_bytes: u8,
}

impl RtpPacket {
    pub fn new(header: RtpHeader, payload: Vec<u8>) -> Self {
        Self {
            header,
            payload,
            padding_bytes: 0,
        }
    }

    /// Convenience constructor.
    pub fn simple(
        payload_type: u8,
        marker: bool,
        seq: u16,
        ts: u32,
        ssrc: u32,
        payload: Vec<u8>,
    ) -> Self {
        let header = RtpHeader::new(payload_type, seq, ts, ssrc).with_marker(marker);
        Self::new(header, payload)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, RtpError> {
        if buf.len() < RTP_HEADER_LEN {
            return Err(RtpError::TooShort);
        }
        let b0 = buf[0];
        let version = b0 >> 6;
        if version != RTP_VERSION {
            return Err(RtpError::BadVersion(version));
        }
        let padding = (b0 & 0x20) != 0;
        let extension = (b0 & 0x10) != 0;
        let cc = (b0 & 0x0F) as usize;
        let b1 = buf[1];

        let mut rdr = Cursor::new(&buf[2..RTP_HEADER_LEN]);
        let sequence_number = rdr.read_u16::<BigEndian>().map_err(|_| RtpError::TooShort)?;
        let timestamp = rdr.read_u32::<BigEndian>().map_err(|_| RtpError::TooShort)?;
        let ssrc = rdr.read_u32::<BigEndian>().map_err(|_| RtpError::TooShort)?;

        let mut idx = RTP_HEADER_LEN;
        if buf.len() < idx + cc * 4 {
            return Err(RtpError::CsrcCountMismatch {
                expected: cc,
                buf_left: buf.len() - idx,
            });
        }
        let mut rdr = Cursor::new(&buf[idx..idx + cc * 4]);
        let mut csrcs = Vec::with_capacity(cc);
        for _ in 0..cc {
            csrcs.push(rdr.read_u32::<BigEndian>().map_err(|_| RtpError::TooShort)?);
        }
        idx += cc * 4;

        let ext = if extension {
            if buf.len() < idx + 4 {
                return Err(RtpError::HeaderExtensionTooShort);
            }
            let mut rdr = Cursor::new(&buf[idx..idx + 4]);
            let profile = rdr
                .read_u16::<BigEndian>()
                .map_err(|_| RtpError::HeaderExtensionTooShort)?;
            let words = rdr
                .read_u16::<BigEndian>()
                .map_err(|_| RtpError::HeaderExtensionTooShort)? as usize;
            idx += 4;
            if buf.len() < idx + words * 4 {
                return Err(RtpError::HeaderExtensionTooShort);
            }
            let data = buf[idx..idx + words * 4].to_vec();
            idx += words * 4;
            Some(RtpHeaderExtension::new(profile, data))
        } else {
            None
        };

        let mut end = buf.len();
        let mut padding_bytes = 0u8;
        if padding {
            padding_bytes = buf[end - 1];
            let pad = padding_bytes as usize;
            if pad == 0 || pad > end - idx {
                return Err(RtpError::PaddingTooShort);
            }
            end -= pad;
        }

        let header = RtpHeader {
            marker: (b1 & 0x80) != 0,
            payload_type: b1 & 0x7F,
            sequence_number,
            timestamp,
            ssrc,
            csrcs,
            extension: ext,
        };
        Ok(Self {
            header,
            payload: buf[idx..end].to_vec(),
            padding_bytes,
        })
    }

    pub fn encoded_len(&self) -> usize {
        self.header.encoded_len() + self.payload.len() + self.padding_bytes as usize
    }

    pub fn encode(&self) -> Result<Vec<u8>, RtpError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out)?;
        Ok(out)
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtpError> {
        let h = &self.header;
        if h.csrcs.len() > MAX_CSRC_COUNT {
            return Err(RtpError::TooManyCsrcs(h.csrcs.len()));
        }
        let padding = self.padding_bytes > 0;
        let extension = h.extension.is_some();
        let b0 = (RTP_VERSION << 6)
            | (u8::from(padding) << 5)
            | (u8::from(extension) << 4)
            | (h.csrcs.len() as u8);
        let b1 = (u8::from(h.marker) << 7) | (h.payload_type & 0x7F);

        // Writes into a Vec<u8> cannot fail.
        let _ = out.write_u8(b0);
        let _ = out.write_u8(b1);
        let _ = out.write_u16::<BigEndian>(h.sequence_number);
        let _ = out.write_u32::<BigEndian>(h.timestamp);
        let _ = out.write_u32::<BigEndian>(h.ssrc);
        for csrc in &h.csrcs {
            let _ = out.write_u32::<BigEndian>(*csrc);
        }
        if let Some(ext) = &h.extension {
            let words = ext.data.len().div_ceil(4);
            let _ = out.write_u16::<BigEndian>(ext.profile);
            let _ = out.write_u16::<BigEndian>(words as u16);
            out.extend_from_slice(&ext.data);
            out.resize(out.len() + (words * 4 - ext.data.len()), 0);
        }
        out.extend_from_slice(&self.payload);
        if padding {
            out.resize(out.len() + self.padding_bytes as usize - 1, 0);
            out.push(self.padding_bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn decodes_fixed_header_fields() {
        let pkt = RtpPacket::simple(0, true, 0xBEEF, 0x0102_0304, 0xCAFE_BABE, vec![1, 2, 3]);
        let bytes = pkt.encode().unwrap();
        assert_eq!(bytes.len(), 15);
        assert_eq!(bytes[0], 0x80);
        assert_eq!(bytes[1], 0x80);
        assert_eq!(&bytes[2..4], &[0xBE, 0xEF]);

        let back = RtpPacket::decode(&bytes).unwrap();
        assert_eq!(back, pkt);
    }

    #[test]
    fn rejects_short_and_wrong_version() {
        assert_eq!(RtpPacket::decode(&[0x80; 11]), Err(RtpError::TooShort));
        let mut bytes = RtpPacket::simple(0, false, 1, 1, 1, vec![]).encode().unwrap();
        bytes[0] = 0x40;
        assert_eq!(RtpPacket::decode(&bytes), Err(RtpError::BadVersion(1)));
    }

    #[test]
    fn skips_csrcs_extension_and_padding() {
        let header = RtpHeader::new(8, 7, 160, 42)
            .with_csrcs(vec![0x11, 0x22])
            .with_extension(Some(RtpHeaderExtension::new(0xBEDE, vec![9, 9, 9, 9])));
        let mut pkt = RtpPacket::new(header, vec![0xAA, 0xBB]);
        pkt.padding_bytes = 2;
        let bytes = pkt.encode().unwrap();
        assert_eq!(bytes.len(), 12 + 8 + 8 + 2 + 2);

        let back = RtpPacket::decode(&bytes).unwrap();
        assert_eq!(back.payload, vec![0xAA, 0xBB]);
        assert_eq!(back.header.csrcs, vec![0x11, 0x22]);
        assert_eq!(back.header.extension.unwrap().profile, 0xBEDE);
        assert_eq!(back.padding_bytes, 2);
    }

    #[test]
    fn truncated_csrc_list_is_reported() {
        let mut bytes = RtpPacket::simple(0, false, 1, 1, 1, vec![0; 4]).encode().unwrap();
        bytes[0] |= 0x03; // claims 3 CSRCs, only 4 bytes follow
        assert_eq!(
            RtpPacket::decode(&bytes),
            Err(RtpError::CsrcCountMismatch {
                expected: 3,
                buf_left: 4
            })
        );
    }

    #[test]
    fn bogus_padding_count_is_rejected() {
        let mut bytes = RtpPacket::simple(0, false, 1, 1, 1, vec![1, 2, 3, 50])
            .encode()
            .unwrap();
        bytes[0] |= 0x20;
        assert_eq!(RtpPacket::decode(&bytes), Err(RtpError::PaddingTooShort));
    }
}
