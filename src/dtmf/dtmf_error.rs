use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DtmfError {
    #[error("a digit sequence is already being sent")]
    Busy,
    #[error("invalid DTMF digit {0:?}")]
    InvalidDigit(char),
    #[error("too many digits: {given} (max {max})")]
    TooManyDigits { given: usize, max: usize },
    #[error("no digits given")]
    Empty,
    #[error("telephone-event not negotiated for this direction")]
    NotSupported,
}
