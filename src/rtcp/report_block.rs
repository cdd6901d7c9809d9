use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{config::REPORT_BLOCK_LEN, rtcp_error::RtcpError};

const CUMULATIVE_LOST_MIN: i32 = -8_388_608;
const CUMULATIVE_LOST_MAX: i32 = 8_388_607;

/// ReportBlock per RFC3550 §6.4.1 (24 bytes): one receiver's view of one source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportBlock {
    pub ssrc: u32,
    pub fraction_lost: u8,
    /// 24-bit signed cumulative number of packets lost.
    pub cumulative_lost: i32,
    /// Extended highest sequence number received.
    pub highest_seq_no_received: u32,
    pub interarrival_jitter: u32,
    pub lsr: u32,
    pub dlsr: u32,
}

impl ReportBlock {
    pub fn decode(buf: &[u8]) -> Result<Self, RtcpError> {
        if buf.len() < REPORT_BLOCK_LEN {
            return Err(RtcpError::Truncated);
        }
        let mut rdr = Cursor::new(&buf[..REPORT_BLOCK_LEN]);
        let ssrc = rdr.read_u32::<BigEndian>().map_err(|_| RtcpError::Truncated)?;
        let fraction_lost = rdr.read_u8().map_err(|_| RtcpError::Truncated)?;
        let cumulative_lost = rdr.read_i24::<BigEndian>().map_err(|_| RtcpError::Truncated)?;
        let highest_seq_no_received = rdr.read_u32::<BigEndian>().map_err(|_| RtcpError::Truncated)?;
        let interarrival_jitter = rdr.read_u32::<BigEndian>().map_err(|_| RtcpError::Truncated)?;
        let lsr = rdr.read_u32::<BigEndian>().map_err(|_| RtcpError::Truncated)?;
        let dlsr = rdr.read_u32::<BigEndian>().map_err(|_| RtcpError::Truncated)?;

        Ok(Self {
            ssrc,
            fraction_lost,
            cumulative_lost,
            highest_seq_no_received,
            interarrival_jitter,
            lsr,
            dlsr,
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let cl = self
            .cumulative_lost
            .clamp(CUMULATIVE_LOST_MIN, CUMULATIVE_LOST_MAX);
        // Writes into a Vec<u8> cannot fail.
        let _ = out.write_u32::<BigEndian>(self.ssrc);
        let _ = out.write_u8(self.fraction_lost);
        let _ = out.write_i24::<BigEndian>(cl);
        let _ = out.write_u32::<BigEndian>(self.highest_seq_no_received);
        let _ = out.write_u32::<BigEndian>(self.interarrival_jitter);
        let _ = out.write_u32::<BigEndian>(self.lsr);
        let _ = out.write_u32::<BigEndian>(self.dlsr);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn negative_cumulative_loss_is_sign_extended() {
        let rb = ReportBlock {
            ssrc: 7,
            cumulative_lost: -3,
            ..Default::default()
        };
        let mut out = Vec::new();
        rb.encode_into(&mut out);
        assert_eq!(out.len(), REPORT_BLOCK_LEN);
        assert_eq!(&out[5..8], &[0xFF, 0xFF, 0xFD]);
        assert_eq!(ReportBlock::decode(&out).unwrap().cumulative_lost, -3);
    }

    #[test]
    fn oversized_loss_is_clamped_to_24_bits() {
        let rb = ReportBlock {
            cumulative_lost: 20_000_000,
            ..Default::default()
        };
        let mut out = Vec::new();
        rb.encode_into(&mut out);
        assert_eq!(
            ReportBlock::decode(&out).unwrap().cumulative_lost,
            CUMULATIVE_LOST_MAX
        );
    }

    #[test]
    fn short_buffer_is_truncated() {
        assert_eq!(ReportBlock::decode(&[0; 23]), Err(RtcpError::Truncated));
    }
}
