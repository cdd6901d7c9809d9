pub mod rtcp_session;
pub mod rtcp_session_config;
pub mod rtcp_stat;
pub mod rx_stats;
pub mod tx_stats;

pub use rtcp_session::RtcpSession;
pub use rtcp_session_config::RtcpSessionConfig;
pub use rtcp_stat::{RtcpStat, RxStreamStat, TxStreamStat};
