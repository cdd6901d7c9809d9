use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RtcpError {
    #[error("buffer too short")]
    TooShort,
    #[error("bad RTCP version: {0}")]
    BadVersion(u8),
    #[error("compound packet does not start with SR or RR (pt={0})")]
    NotAReport(u8),
    #[error("truncated RTCP structure")]
    Truncated,
    #[error("SDES item too short")]
    SdesItemTooShort,
    #[error("SDES item longer than 255 bytes")]
    SdesItemTooLong,
    #[error("too many report blocks: {0}")]
    TooManyReportBlocks(usize),
    #[error("too many BYE sources: {0}")]
    TooManyByeSources(usize),
}
