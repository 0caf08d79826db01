//! Status code → log level mapping.
//!
//! [`LevelMap`] is an ordered list of rules; the first rule whose
//! [`StatusMatch`] accepts the code decides the level, and codes no rule
//! accepts log at `INFO`. [`LevelCache`] remembers each code's answer for
//! the lifetime of the middleware that owns it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::HttpLogError;

/// A single status code or an inclusive range of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StatusMatch {
    Exact(u16),
    Range(u16, u16),
}

impl StatusMatch {
    #[must_use]
    pub const fn matches(&self, code: u16) -> bool {
        match *self {
            Self::Exact(expected) => expected == code,
            Self::Range(a, b) => {
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                low <= code && code <= high
            }
        }
    }
}

impl From<u16> for StatusMatch {
    fn from(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl From<(u16, u16)> for StatusMatch {
    fn from((low, high): (u16, u16)) -> Self {
        Self::Range(low, high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    rules: Vec<(Level, StatusMatch)>,
}

impl Default for LevelMap {
    /// `INFO` for 200-399, `ERROR` for 400-499.
    fn default() -> Self {
        Self::empty()
            .rule(Level::INFO, (200, 399))
            .rule(Level::ERROR, (400, 499))
    }
}

impl LevelMap {
    /// A map with no rules; every code logs at `INFO`.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Rules are tried in the order they were added.
    #[must_use]
    pub fn rule(mut self, level: Level, status: impl Into<StatusMatch>) -> Self {
        self.rules.push((level, status.into()));
        self
    }

    #[must_use]
    pub fn resolve(&self, code: u16) -> Level {
        self.rules
            .iter()
            .find(|(_, status)| status.matches(code))
            .map_or(Level::INFO, |(level, _)| *level)
    }

    #[must_use]
    pub fn rules(&self) -> &[(Level, StatusMatch)] {
        &self.rules
    }
}

impl FromIterator<(Level, StatusMatch)> for LevelMap {
    fn from_iter<I: IntoIterator<Item = (Level, StatusMatch)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Parse a level name as written in config files.
///
/// Accepts the `tracing` names plus the syslog-style names other loggers
/// use, folded onto the nearest `tracing` level.
pub fn parse_level(name: &str) -> Result<Level, HttpLogError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" | "notice" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" | "critical" | "alert" | "emergency" => Ok(Level::ERROR),
        _ => Err(HttpLogError::UnknownLevel(name.to_string())),
    }
}

/// Per-status-code memo of [`LevelMap::resolve`].
///
/// Concurrent misses on the same code may both resolve it; they compute
/// the same level, so the second write changes nothing.
#[derive(Debug, Default)]
pub struct LevelCache {
    entries: RwLock<HashMap<u16, Level>>,
}

impl LevelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, code: u16, map: &LevelMap) -> Level {
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&code)
            .copied();
        if let Some(level) = cached {
            return level;
        }

        let level = map.resolve(code);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code, level);
        level
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
