use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JitterBufferError {
    #[error("invalid jitter buffer config: {0}")]
    InvalidConfig(String),
}
