use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{config::SENDER_INFO_LEN, rtcp_error::RtcpError};
use crate::rtp::time::NtpTime;

/// Sender info in SR (20 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SenderInfo {
    pub ntp: NtpTime,
    pub rtp_ts: u32,
    pub packet_count: u32,
    pub octet_count: u32,
}

impl SenderInfo {
    pub fn decode(buf: &[u8]) -> Result<Self, RtcpError> {
        if buf.len() < SENDER_INFO_LEN {
            return Err(RtcpError::Truncated);
        }
        let mut rdr = Cursor::new(&buf[..SENDER_INFO_LEN]);
        let mut next = || rdr.read_u32::<BigEndian>().map_err(|_| RtcpError::Truncated);
        let msw = next()?;
        let lsw = next()?;
        Ok(Self {
            ntp: NtpTime::new(msw, lsw),
            rtp_ts: next()?,
            packet_count: next()?,
            octet_count: next()?,
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        for word in [
            self.ntp.msw,
            self.ntp.lsw,
            self.rtp_ts,
            self.packet_count,
            self.octet_count,
        ] {
            let _ = out.write_u32::<BigEndian>(word);
        }
    }
}
