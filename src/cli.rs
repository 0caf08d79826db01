//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (preview, validate), and their associated argument structs.
//! Flags that make sense in a container have environment variable
//! equivalents.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::model::Preset;

#[derive(Parser)]
#[command(
    name = "httplog",
    version,
    about = "Template-driven HTTP request/response logging",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        httplog preview --preset short           Render a GET / → 200 exchange\n  \
        httplog preview -c httplog.yaml -s 503    Try a config against a 503\n  \
        httplog validate httplog.yaml             Check a config file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a synthetic exchange through the middleware
    Preview(Box<PreviewArgs>),

    /// Validate a config file
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        httplog preview --preset clf -H 'User-Agent: curl/8.0'\n  \
        httplog preview --template '{method} {uri} {code} {res.body}' --response-body hi\n  \
        httplog preview --preset debug --fail 'connection refused'")]
pub struct PreviewArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "HTTPLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in template (overrides the config file)
    #[arg(long, conflicts_with = "template")]
    pub preset: Option<Preset>,

    /// Custom template (overrides the config file)
    #[arg(short, long)]
    pub template: Option<String>,

    // -- Request --
    /// Request method
    #[arg(short = 'X', long, default_value = "GET", help_heading = "Request")]
    pub method: String,

    /// Request URI
    #[arg(short, long, default_value = "/", help_heading = "Request")]
    pub uri: String,

    /// Request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", help_heading = "Request")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(long, help_heading = "Request")]
    pub body: Option<String>,

    // -- Response --
    /// Response status code
    #[arg(short, long, default_value_t = 200, help_heading = "Response")]
    pub status: u16,

    /// Response header, "Name: value" (repeatable)
    #[arg(long = "response-header", help_heading = "Response")]
    pub response_headers: Vec<String>,

    /// Response body
    #[arg(long, help_heading = "Response")]
    pub response_body: Option<String>,

    /// Fail the downstream call with this message instead of responding
    #[arg(long, help_heading = "Response")]
    pub fail: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "trace")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "httplog.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
