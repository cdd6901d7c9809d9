use thiserror::Error;

/// Reasons a datagram is not a usable RTP packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RtpError {
    #[error("buffer too short")]
    TooShort,
    #[error("bad RTP version: {0}")]
    BadVersion(u8),
    #[error("CSRC count mismatch: expected {expected}x4 bytes, but only {buf_left} bytes remain")]
    CsrcCountMismatch { expected: usize, buf_left: usize },
    #[error("RTP header extension too short")]
    HeaderExtensionTooShort,
    #[error("padding bit set but payload shorter than padding count")]
    PaddingTooShort,
    #[error("too many CSRCs: {0}")]
    TooManyCsrcs(usize),
}
