use crate::{
    config::{Config, ConfigError},
    dtmf::DtmfConfig,
    jitter_buffer::JitterBufferConfig,
    rtcp_session::RtcpSessionConfig,
    rtp_session::RtpSessionConfig,
};

/// Tunables for every component of a stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamConfig {
    pub rtp: RtpSessionConfig,
    pub jitter_buffer: JitterBufferConfig,
    pub rtcp: RtcpSessionConfig,
    pub dtmf: DtmfConfig,
}

impl StreamConfig {
    /// Reads the `[Rtp]`, `[JitterBuffer]`, `[Rtcp]` and `[Dtmf]` sections.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            rtp: RtpSessionConfig::from_config(cfg)?,
            jitter_buffer: JitterBufferConfig::from_config(cfg)?,
            rtcp: RtcpSessionConfig::from_config(cfg)?,
            dtmf: DtmfConfig::from_config(cfg)?,
        })
    }
}
