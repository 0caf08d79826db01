//! Configuration loading and validation.
//!
//! A config file picks the template (a preset or a custom string), the
//! binary body pattern and the status → level rules. [`parse_config_str`]
//! deserializes by file extension, with each format gated by a feature
//! flag; [`read`] loads a file without judging it and [`load`] also validates it.

pub mod model;
pub mod validation;

use std::path::Path;

use crate::error::HttpLogError;
use model::Config;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, HttpLogError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| HttpLogError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| HttpLogError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| HttpLogError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(HttpLogError::UnsupportedFormat(other.to_string())),
    }
}

/// Read a config file and parse it by extension, without validating it.
pub fn read(path: &Path) -> Result<Config, HttpLogError> {
    if !path.exists() {
        return Err(HttpLogError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// Read a config file, parse it by extension and validate it.
pub fn load(path: &Path) -> Result<Config, HttpLogError> {
    let config = read(path)?;
    validation::validate(&config).map_err(|errors| HttpLogError::ConfigValidation { errors })?;

    tracing::debug!(
        path = %path.display(),
        rules = config.levels.len(),
        "config loaded"
    );
    Ok(config)
}
