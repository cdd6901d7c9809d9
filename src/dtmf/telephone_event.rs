//! RFC4733 telephone-event payload:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     event     |E|R| volume    |          duration             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::rtp::RtpError;

pub const TELEPHONE_EVENT_LEN: usize = 4;
const END_BIT: u8 = 0x80;
const VOLUME_MASK: u8 = 0x3F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelephoneEvent {
    pub event: u8,
    pub end: bool,
    /// Power level in -dBm0, 0..=63.
    pub volume: u8,
    /// Duration so far, in RTP timestamp units.
    pub duration: u16,
}

impl TelephoneEvent {
    pub fn decode(buf: &[u8]) -> Result<Self, RtpError> {
        if buf.len() < TELEPHONE_EVENT_LEN {
            return Err(RtpError::TooShort);
        }
        let mut rdr = Cursor::new(buf);
        let event = rdr.read_u8().map_err(|_| RtpError::TooShort)?;
        let flags = rdr.read_u8().map_err(|_| RtpError::TooShort)?;
        let duration = rdr.read_u16::<BigEndian>().map_err(|_| RtpError::TooShort)?;
        Ok(Self {
            event,
            end: (flags & END_BIT) != 0,
            volume: flags & VOLUME_MASK,
            duration,
        })
    }

    pub fn encode(&self) -> [u8; TELEPHONE_EVENT_LEN] {
        let mut out = [0u8; TELEPHONE_EVENT_LEN];
        let mut w = Cursor::new(&mut out[..]);
        let flags = if self.end { END_BIT } else { 0 } | (self.volume & VOLUME_MASK);
        // Fixed-size buffer sized for exactly these writes.
        let _ = w.write_u8(self.event);
        let _ = w.write_u8(flags);
        let _ = w.write_u16::<BigEndian>(self.duration);
        out
    }
}
