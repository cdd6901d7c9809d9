mod dup_window;
pub mod rtp_codec;
pub mod rtp_session;
pub mod rtp_session_config;
pub mod rtp_session_error;
pub mod rx_tracker;
pub mod seq_ext;
pub mod tx_tracker;

pub use rtp_codec::RtpCodec;
pub use rtp_session::{RtpSession, RtpSessionInfo};
pub use rtp_session_config::RtpSessionConfig;
pub use rtp_session_error::RtpSessionError;
pub use rx_tracker::RxDecision;
