use std::time::Duration;

/// Receive direction as seen locally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RxStreamStat {
    pub packets: u64,
    pub octets: u64,
    pub expected: u32,
    pub cumulative_lost: i64,
    /// Loss of the last report interval, 8-bit fixed point.
    pub fraction_lost: u8,
    pub highest_ext_seq: u32,
    /// Smoothed interarrival jitter in RTP clock units.
    pub jitter: f64,
    pub jitter_ms: f64,
    pub frames_played: u64,
    pub frames_concealed: u64,
    /// Pulls that produced silence (prefetching or underflow).
    pub frames_silent: u64,
}

/// Transmit direction, including what the remote reported back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxStreamStat {
    pub packets: u64,
    pub octets: u64,
    pub remote_fraction_lost: u8,
    pub remote_cumulative_lost: i32,
    pub remote_highest_ext_seq: u32,
    pub remote_jitter: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtcpStat {
    pub rx: RxStreamStat,
    pub tx: TxStreamStat,
    pub rtt: Option<Duration>,
    pub sr_sent: u64,
    pub rr_sent: u64,
    pub rtcp_received: u64,
    pub rtcp_malformed: u64,
    pub bye_received: bool,
    pub bye_reason: Option<String>,
    pub remote_cname: Option<String>,
}
