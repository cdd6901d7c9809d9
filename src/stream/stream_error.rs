use std::sync::PoisonError;

use thiserror::Error;

use super::stream_state::StreamState;
use crate::{
    codec::CodecError, config::ConfigError, dtmf::DtmfError, jitter_buffer::JitterBufferError,
    rtcp::RtcpError, rtp_session::RtpSessionError, timer::TimerError,
    transport::TransportError,
};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("{op} is not valid while the stream is {state:?}")]
    InvalidOperation {
        op: &'static str,
        state: StreamState,
    },
    #[error("invalid stream info: {0}")]
    InvalidInfo(String),
    #[error("codec open failed: {0}")]
    CodecOpen(#[source] CodecError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("DTMF error: {0}")]
    Dtmf(#[from] DtmfError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("jitter buffer error: {0}")]
    JitterBuffer(#[from] JitterBufferError),
    #[error("RTP error: {0}")]
    Rtp(#[from] RtpSessionError),
    #[error("RTCP error: {0}")]
    Rtcp(#[from] RtcpError),
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),
    #[error("stream lock poisoned")]
    MutexPoisoned,
}

impl<T> From<PoisonError<T>> for StreamError {
    fn from(_: PoisonError<T>) -> Self {
        Self::MutexPoisoned
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
