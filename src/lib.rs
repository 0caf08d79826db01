//! httplog is template-driven logging middleware for HTTP exchanges.
//!
//! A [`HttpLogger`] sits around a downstream call. It times the call,
//! renders the request and response into one line through a template
//! such as `{method} {target} {code}`, picks a log level from the
//! response status and hands the line to a sink. Failed calls are logged
//! at `ERROR` and their error is passed back unchanged.
//!
//! # Architecture
//!
//! - [`body`] -- The [`ReplayBody`] trait and the [`Body`] type: bodies the
//!   formatter can read from the start without consuming them.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (preview, validate).
//! - [`config`] -- Config file loading and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`format`] -- Placeholder templates, the built-in presets and the
//!   [`MessageFormatter`] trait.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- [`HttpLogger`], status → level mapping and the
//!   tower [`HttpLogLayer`].
//! - [`sink`] -- Where rendered lines go: [`TracingSink`] or the in-memory
//!   [`MemorySink`] used by tests.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All config file formats |
//! | `full` | All features |

#![allow(clippy::missing_errors_doc)]

pub mod body;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod middleware;
pub mod sink;

pub use body::{Body, ReplayBody};
pub use error::{BodyError, HttpLogError};
pub use format::{HttpMessageFormatter, MessageFormatter};
pub use middleware::{HttpLogLayer, HttpLogService, HttpLogger, LevelMap, StatusMatch};
pub use sink::{LogContext, LogSink, MemorySink, TracingSink};
