use thiserror::Error;

use crate::rtp::rtp_error::RtpError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RtpSessionError {
    /// Inbound datagram is not a valid RTP packet. Callers drop it.
    #[error("malformed RTP packet: {0}")]
    MalformedPacket(#[from] RtpError),
    #[error("cannot build RTP packet: {0}")]
    Encode(RtpError),
}
