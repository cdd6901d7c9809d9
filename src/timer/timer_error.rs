use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("could not spawn timer thread: {0}")]
    Spawn(String),
    #[error("interval must be non-zero")]
    ZeroInterval,
}
