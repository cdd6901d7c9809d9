use crate::{rtcp_session::RtcpStat, rtp_session::RtpSessionInfo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtmfStat {
    pub digits_sent: u64,
    pub digits_received: u64,
    /// Finalized digits lost to a full queue.
    pub digits_dropped: u64,
    pub malformed_events: u64,
}

/// Snapshot returned by `Stream::get_stat`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamStat {
    pub rtcp: RtcpStat,
    pub rtp: RtpSessionInfo,
    pub dtmf: DtmfStat,
    /// Packets with a payload type that is neither the codec nor telephone-event.
    pub rx_unknown_pt: u64,
    /// Payloads discarded while receive was paused.
    pub rx_dropped_paused: u64,
}
