use crate::config::{Config, ConfigError};

const SECTION: &str = "Dtmf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtmfConfig {
    /// Used when `dial` is given a zero duration.
    pub default_duration_ms: u32,
    /// Power level in -dBm0 carried in every event packet.
    pub volume: u8,
    /// Extra copies of the final (E-bit) packet.
    pub end_retransmit: u32,
    /// Digits accepted by a single `dial`.
    pub max_digits: usize,
    /// Received digits kept while no observer is attached.
    pub queue_capacity: usize,
    /// Accept `R` (hook flash, event 16) when dialing.
    pub allow_flash: bool,
}

impl Default for DtmfConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 200,
            volume: 10,
            end_retransmit: 2,
            max_digits: 32,
            queue_capacity: 32,
            allow_flash: true,
        }
    }
}

impl DtmfConfig {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            default_duration_ms: cfg.get_parsed(SECTION, "duration_ms", d.default_duration_ms)?,
            volume: cfg.get_parsed(SECTION, "volume", d.volume)?.min(63),
            end_retransmit: cfg.get_parsed(SECTION, "end_retransmit", d.end_retransmit)?,
            max_digits: cfg.get_parsed(SECTION, "max_digits", d.max_digits)?,
            queue_capacity: cfg.get_parsed(SECTION, "queue_capacity", d.queue_capacity)?,
            allow_flash: cfg.get_bool(SECTION, "flash", d.allow_flash)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn reads_section_and_clamps_volume() {
        let cfg = Config::parse("[Dtmf]\nduration_ms = 120\nvolume = 90\nflash = off\n");
        let d = DtmfConfig::from_config(&cfg).unwrap();
        assert_eq!(d.default_duration_ms, 120);
        assert_eq!(d.volume, 63);
        assert!(!d.allow_flash);
        assert_eq!(d.end_retransmit, 2);
    }
}
