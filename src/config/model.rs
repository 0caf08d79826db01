//! Serde data structures for the httplog configuration file.
//!
//! Contains [`Config`] (the root), [`Preset`] and [`LevelRule`]. All types
//! derive `Serialize` and `Deserialize` with `deny_unknown_fields` for
//! strict parsing.

use serde::{Deserialize, Serialize};

use crate::error::HttpLogError;
use crate::format::HttpMessageFormatter;
use crate::middleware::level::{parse_level, LevelMap, StatusMatch};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// One of the built-in templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,

    /// A custom template. Mutually exclusive with `preset`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Bytes regex; a body matching it is logged as binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_pattern: Option<String>,

    /// Ordered status → level rules. Empty means the default map.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<LevelRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Clf,
    Short,
    Debug,
    DebugJson,
}

impl Preset {
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::Clf => HttpMessageFormatter::CLF,
            Self::Short => HttpMessageFormatter::SHORT,
            Self::Debug => HttpMessageFormatter::DEBUG,
            Self::DebugJson => HttpMessageFormatter::DEBUG_JSON,
        }
    }
}

/// One `{level, status}` entry of the `levels` list.
///
/// `level` is a `tracing` level name or a syslog-style name. Syslog names
/// have no `tracing` counterpart and are folded before reaching the sink:
/// `notice` logs as `INFO`, `warning` as `WARN`, and `critical`, `alert`
/// and `emergency` as `ERROR`. The sink sees the folded level, not the
/// name written here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LevelRule {
    pub level: String,
    pub status: StatusMatch,
}

impl Config {
    /// The template in effect: the custom one, else the preset, else `DEBUG`.
    #[must_use]
    pub fn effective_template(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or_else(|| self.preset.unwrap_or(Preset::Debug).template())
    }

    pub fn formatter(&self) -> Result<HttpMessageFormatter, HttpLogError> {
        let formatter = HttpMessageFormatter::new(self.effective_template());
        match self.binary_pattern.as_deref() {
            Some(pattern) => formatter.with_binary_pattern(pattern),
            None => Ok(formatter),
        }
    }

    pub fn level_map(&self) -> Result<LevelMap, HttpLogError> {
        if self.levels.is_empty() {
            return Ok(LevelMap::default());
        }
        self.levels
            .iter()
            .map(|rule| parse_level(&rule.level).map(|level| (level, rule.status)))
            .collect()
    }
}
