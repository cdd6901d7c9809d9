use super::rx_tracker::{DEFAULT_MAX_MISORDER, DEFAULT_PROBATION_LIMIT};
use crate::config::{Config, ConfigError};

const SECTION: &str = "Rtp";

/// Forward jump used when neither the config nor the stream supplies one.
pub const DEFAULT_MAX_DROPOUT: u16 = 32;

/// Receive-side validation knobs and optional fixed local SSRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpSessionConfig {
    /// Contiguous packets needed before a new SSRC is trusted.
    pub probation: u32,
    /// Packets accepted from an unvalidated source before the rest are dropped.
    pub probation_limit: u32,
    /// Forward jump that, once confirmed, restarts the sequence baseline.
    /// A stream fills this in with its jitter buffer capacity when unset.
    pub max_dropout: Option<u16>,
    /// How far behind the highest sequence a packet still counts as reordered.
    pub max_misorder: u16,
    /// Local SSRC; random when `None`.
    pub local_ssrc: Option<u32>,
}

impl Default for RtpSessionConfig {
    fn default() -> Self {
        Self {
            probation: 2,
            probation_limit: DEFAULT_PROBATION_LIMIT,
            max_dropout: None,
            max_misorder: DEFAULT_MAX_MISORDER,
            local_ssrc: None,
        }
    }
}

impl RtpSessionConfig {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let d = Self::default();
        let optional = |key: &str| -> Result<Option<u32>, ConfigError> {
            match cfg.get(SECTION, key) {
                None => Ok(None),
                Some(_) => cfg.get_parsed(SECTION, key, 0u32).map(Some),
            }
        };
        let max_dropout = match cfg.get(SECTION, "max_dropout") {
            None => None,
            Some(_) => Some(cfg.get_parsed(SECTION, "max_dropout", DEFAULT_MAX_DROPOUT)?),
        };
        Ok(Self {
            probation: cfg.get_parsed(SECTION, "probation", d.probation)?,
            probation_limit: cfg.get_parsed(SECTION, "probation_limit", d.probation_limit)?,
            max_dropout,
            max_misorder: cfg.get_parsed(SECTION, "max_misorder", d.max_misorder)?,
            local_ssrc: optional("local_ssrc")?,
        })
    }

    /// `max_dropout`, or `fallback` when it was left unset.
    pub fn max_dropout_or(&self, fallback: u16) -> u16 {
        self.max_dropout.unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn unset_dropout_defers_to_the_caller() {
        let cfg = RtpSessionConfig::from_config(&Config::empty()).unwrap();
        assert_eq!(cfg.max_dropout, None);
        assert_eq!(cfg.max_dropout_or(64), 64);

        let cfg = RtpSessionConfig::from_config(&Config::parse("[Rtp]\nmax_dropout = 20\nlocal_ssrc = 7\n"))
            .unwrap();
        assert_eq!(cfg.max_dropout_or(64), 20);
        assert_eq!(cfg.local_ssrc, Some(7));
    }
}
