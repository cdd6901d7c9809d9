pub mod rtcp_interval;
pub mod stream;
pub mod stream_config;
pub mod stream_error;
pub mod stream_info;
pub mod stream_state;
pub mod stream_stat;

pub use stream::{RTCP_TICK, Stream, StreamCollaborators};
pub use stream_config::StreamConfig;
pub use stream_error::StreamError;
pub use stream_info::StreamInfo;
pub use stream_state::{Direction, StreamState};
pub use stream_stat::{DtmfStat, StreamStat};
