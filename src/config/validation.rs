//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for problems that
//! serde cannot see: conflicting template settings, an empty template, a
//! binary pattern that does not compile, unknown level names and status
//! codes outside the HTTP range. Every problem is reported, each as a
//! [`ValidationError`] with a suggestion where one helps.

use super::model::Config;
use crate::error::ValidationError;
use crate::format::token::PLACEHOLDER;
use crate::middleware::level::{parse_level, StatusMatch};

pub const KNOWN_LEVELS: &[&str] = &[
    "trace", "debug", "info", "notice", "warn", "warning", "error", "critical", "alert",
    "emergency",
];

/// Validate a status code. Returns `Ok(())` or a human-readable error.
pub fn validate_status(code: u16) -> Result<(), String> {
    if (100..=999).contains(&code) {
        Ok(())
    } else {
        Err(format!("{code} is not an HTTP status code (expected 100-999)"))
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.preset.is_some() && config.template.is_some() {
        errors.push(ValidationError {
            field: "template".into(),
            message: "'preset' and 'template' are mutually exclusive".into(),
            suggestion: Some("remove one of them".into()),
        });
    }

    if let Some(ref template) = config.template {
        if template.trim().is_empty() {
            errors.push(ValidationError {
                field: "template".into(),
                message: "template cannot be empty".into(),
                suggestion: Some("use a preset such as 'short' or 'clf'".into()),
            });
        } else if !PLACEHOLDER.is_match(template) {
            tracing::warn!(template = %template, "template has no placeholders");
        }
    }

    if let Some(ref pattern) = config.binary_pattern {
        if let Err(e) = regex::bytes::Regex::new(pattern) {
            errors.push(ValidationError {
                field: "binary_pattern".into(),
                message: format!("invalid regex: {e}"),
                suggestion: None,
            });
        }
    }

    for (i, rule) in config.levels.iter().enumerate() {
        if parse_level(&rule.level).is_err() {
            errors.push(ValidationError {
                field: format!("levels[{i}].level"),
                message: format!("'{}' is not a known log level", rule.level),
                suggestion: Some(format!("expected one of: {}", KNOWN_LEVELS.join(", "))),
            });
        }

        let codes = match rule.status {
            StatusMatch::Exact(code) => vec![code],
            StatusMatch::Range(low, high) => vec![low, high],
        };
        for code in codes {
            if let Err(msg) = validate_status(code) {
                errors.push(ValidationError {
                    field: format!("levels[{i}].status"),
                    message: msg,
                    suggestion: None,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// One-screen summary of a valid config, used by `httplog validate`.
#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    use std::fmt::Write;

    let mut report = format!("{path} is valid\n\n  template: {:?}\n", config.effective_template());
    if config.binary_pattern.is_some() {
        let _ = writeln!(report, "  binary pattern: custom");
    }
    if config.levels.is_empty() {
        let _ = writeln!(report, "  levels: default (info 200-399, error 400-499)");
    } else {
        let _ = writeln!(report, "  levels:");
        for rule in &config.levels {
            let status = match rule.status {
                StatusMatch::Exact(code) => code.to_string(),
                StatusMatch::Range(low, high) => format!("{low}-{high}"),
            };
            let _ = writeln!(report, "    {} \u{2192} {status}", rule.level);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{LevelRule, Preset};

    fn rule(level: &str, status: StatusMatch) -> LevelRule {
        LevelRule {
            level: level.into(),
            status,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn preset_and_template_conflict() {
        let config = Config {
            preset: Some(Preset::Clf),
            template: Some("{code}".into()),
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "template");
    }

    #[test]
    fn empty_template_rejected() {
        let config = Config {
            template: Some("  ".into()),
            ..Config::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn bad_binary_pattern_rejected() {
        let config = Config {
            binary_pattern: Some("[".into()),
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors[0].field, "binary_pattern");
    }

    #[test]
    fn collects_every_level_error() {
        let config = Config {
            levels: vec![
                rule("loud", StatusMatch::Exact(200)),
                rule("error", StatusMatch::Range(400, 1200)),
            ],
            ..Config::default()
        };
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "levels[0].level");
        assert!(errors[0].suggestion.as_deref().unwrap().contains("warning"));
        assert_eq!(errors[1].field, "levels[1].status");
    }

    #[test]
    fn status_bounds() {
        assert!(validate_status(100).is_ok());
        assert!(validate_status(599).is_ok());
        assert!(validate_status(99).is_err());
        assert!(validate_status(1000).is_err());
    }

    #[test]
    fn report_lists_rules() {
        let config = Config {
            preset: Some(Preset::Short),
            levels: vec![rule("warning", StatusMatch::Range(400, 499))],
            ..Config::default()
        };
        let report = format_validation_report("httplog.yaml", &config);
        assert!(report.starts_with("httplog.yaml is valid"));
        assert!(report.contains("warning \u{2192} 400-499"));
    }
}
