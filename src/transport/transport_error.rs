use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("a receive callback is already registered")]
    AlreadyRegistered,
    #[error("could not spawn receive thread: {0}")]
    Spawn(String),
    #[error("transport closed")]
    Closed,
}
