use std::time::Duration;

use crate::config::{Config, ConfigError};

const SECTION: &str = "Rtcp";

#[derive(Debug, Clone, PartialEq)]
pub struct RtcpSessionConfig {
    /// Canonical name sent in every SDES.
    pub cname: String,
    /// Average report interval; each actual interval is randomized around it.
    pub interval: Duration,
    /// Floor applied to `interval` before randomization (RFC3550 Tmin).
    pub min_interval: Duration,
}

impl Default for RtcpSessionConfig {
    fn default() -> Self {
        Self {
            cname: "rustystream@localhost".into(),
            interval: Duration::from_secs(5),
            min_interval: Duration::from_secs(5),
        }
    }
}

impl RtcpSessionConfig {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let d = Self::default();
        let interval_ms = cfg.get_parsed(SECTION, "interval_ms", d.interval.as_millis() as u64)?;
        let min_ms = cfg.get_parsed(SECTION, "min_interval_ms", d.min_interval.as_millis() as u64)?;
        Ok(Self {
            cname: cfg.get_or_default(SECTION, "cname", &d.cname).to_string(),
            interval: Duration::from_millis(interval_ms),
            min_interval: Duration::from_millis(min_ms),
        })
    }
}
