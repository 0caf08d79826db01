//! `httplog validate` — check a configuration file for errors.
//!
//! The report goes to stdout when the file is valid and to stderr when it
//! is not, as text or as one JSON object.

use serde_json::json;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::{self, model::Config, validation};
use crate::error::{HttpLogError, ValidationError};

pub fn execute(args: &ValidateArgs) -> Result<(), HttpLogError> {
    let origin = args.config.display().to_string();
    let config = config::read(&args.config)?;
    let outcome = validation::validate(&config);
    let errors = outcome.as_ref().err().map(Vec::as_slice);
    let report = render(&args.format, &origin, &config, errors);

    match outcome {
        Ok(()) => {
            println!("{report}");
            Ok(())
        }
        Err(errors) => {
            eprintln!("{report}");
            Err(HttpLogError::ConfigValidation { errors })
        }
    }
}

fn render(
    format: &ValidateFormat,
    origin: &str,
    config: &Config,
    errors: Option<&[ValidationError]>,
) -> String {
    match (format, errors) {
        (ValidateFormat::Text, None) => {
            format!("\u{2713} {}", validation::format_validation_report(origin, config))
        }
        (ValidateFormat::Text, Some(errors)) => {
            let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
            format!(
                "\u{2717} {origin} has {} errors\n\n{}",
                errors.len(),
                lines.join("\n")
            )
        }
        (ValidateFormat::Json, None) => json!({
            "valid": true,
            "template": config.effective_template(),
            "rules": config.levels.len(),
        })
        .to_string(),
        (ValidateFormat::Json, Some(errors)) => {
            let errors: Vec<_> = errors
                .iter()
                .map(|e| {
                    json!({
                        "field": e.field,
                        "message": e.message,
                        "suggestion": e.suggestion,
                    })
                })
                .collect();
            json!({ "valid": false, "errors": errors }).to_string()
        }
    }
}
