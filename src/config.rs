use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("error reading file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("invalid value {value:?} for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// INI-style settings: `[Section]` headers, `key = value` lines, `#` comments.
///
/// Keys before the first section header are globals and act as a fallback
/// for every section.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some(pos) = line.find('=') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
            .or_else(|| self.get_global(key))
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Typed lookup. A missing or empty key yields `default`; a present but
    /// unparsable one is an error rather than a silent fallback.
    pub fn get_parsed<T: FromStr>(
        &self,
        section: &str,
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.get(section, key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                section: section.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Like [`Config::get_parsed`] but also accepts `yes/no/on/off/1/0`.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(section, key).map(|s| s.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    section: section.to_string(),
                    key: key.to_string(),
                    value: v,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# global fallback
cname = "alice@host"

[JitterBuffer]
min_prefetch = 2
max_prefetch = 12
capacity =

[Dtmf]
flash = yes
"#;

    #[test]
    fn parses_sections_and_globals() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get("JitterBuffer", "min_prefetch"), Some("2"));
        assert_eq!(cfg.get_global("cname"), Some("alice@host"));
        // globals act as a fallback for any section
        assert_eq!(cfg.get("Rtcp", "cname"), Some("alice@host"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get("JitterBuffer", "capacity"), None);
        assert_eq!(cfg.get_parsed("JitterBuffer", "capacity", 32usize), Ok(32));
    }

    #[test]
    fn typed_values_parse_or_fail_loudly() {
        let cfg = Config::parse("[Rtp]\nprobation = two\n");
        assert_eq!(
            cfg.get_parsed::<u32>("Rtp", "probation", 2),
            Err(ConfigError::InvalidValue {
                section: "Rtp".into(),
                key: "probation".into(),
                value: "two".into(),
            })
        );
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get_parsed("JitterBuffer", "max_prefetch", 0u16), Ok(12));
        assert_eq!(cfg.get_bool("Dtmf", "flash", false), Ok(true));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load("/definitely/not/here.ini").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
