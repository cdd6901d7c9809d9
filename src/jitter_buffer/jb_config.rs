use super::jb_error::JitterBufferError;
use crate::config::{Config, ConfigError};

const SECTION: &str = "JitterBuffer";

#[derive(Debug, Clone, PartialEq)]
pub struct JitterBufferConfig {
    /// Ring size in frames. Must be at least `max_prefetch`.
    pub capacity: u16,
    pub min_prefetch: u16,
    pub max_prefetch: u16,
    /// Prefetch level used until the first adaptation.
    pub init_prefetch: u16,
    /// Largest payload a slot can hold; slot storage is allocated up front.
    pub max_frame_size: usize,
    /// Pulled frames per adaptation window.
    pub history_len: u32,
    /// Late/missing rate above which the prefetch grows.
    pub grow_threshold: f64,
    /// Late/missing rate below which a window counts as quiet.
    pub shrink_threshold: f64,
    /// Consecutive quiet windows before the prefetch shrinks.
    pub shrink_sustain: u32,
    pub step: u16,
}

impl Default for JitterBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            min_prefetch: 1,
            max_prefetch: 16,
            init_prefetch: 3,
            max_frame_size: 1500,
            history_len: 100,
            grow_threshold: 0.05,
            shrink_threshold: 0.01,
            shrink_sustain: 3,
            step: 1,
        }
    }
}

impl JitterBufferConfig {
    pub fn validate(&self) -> Result<(), JitterBufferError> {
        let invalid = |reason: &str| Err(JitterBufferError::InvalidConfig(reason.to_string()));
        if self.min_prefetch == 0 {
            return invalid("min_prefetch must be at least 1");
        }
        if self.min_prefetch > self.max_prefetch {
            return invalid("min_prefetch exceeds max_prefetch");
        }
        if !(self.min_prefetch..=self.max_prefetch).contains(&self.init_prefetch) {
            return invalid("init_prefetch outside [min_prefetch, max_prefetch]");
        }
        if self.capacity < self.max_prefetch {
            return invalid("capacity smaller than max_prefetch");
        }
        if self.history_len == 0 || self.step == 0 {
            return invalid("history_len and step must be non-zero");
        }
        if self.shrink_threshold > self.grow_threshold {
            return invalid("shrink_threshold above grow_threshold");
        }
        Ok(())
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            capacity: cfg.get_parsed(SECTION, "capacity", d.capacity)?,
            min_prefetch: cfg.get_parsed(SECTION, "min_prefetch", d.min_prefetch)?,
            max_prefetch: cfg.get_parsed(SECTION, "max_prefetch", d.max_prefetch)?,
            init_prefetch: cfg.get_parsed(SECTION, "init_prefetch", d.init_prefetch)?,
            max_frame_size: cfg.get_parsed(SECTION, "max_frame_size", d.max_frame_size)?,
            history_len: cfg.get_parsed(SECTION, "history_len", d.history_len)?,
            grow_threshold: cfg.get_parsed(SECTION, "grow_threshold", d.grow_threshold)?,
            shrink_threshold: cfg.get_parsed(SECTION, "shrink_threshold", d.shrink_threshold)?,
            shrink_sustain: cfg.get_parsed(SECTION, "shrink_sustain", d.shrink_sustain)?,
            step: cfg.get_parsed(SECTION, "step", d.step)?,
        })
    }
}
