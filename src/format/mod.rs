//! Template-driven rendering of HTTP exchanges into log messages.
//!
//! [`HttpMessageFormatter`] substitutes `{token}` placeholders in a fixed
//! template with values drawn from the request, the optional response and
//! the optional error. The vocabulary lives in [`token`]; rendering of the
//! individual message parts lives in [`render`].
//!
//! Every distinct token is resolved once per [`format`](MessageFormatter::format)
//! call, so a template that repeats `{ts}` prints one timestamp, and each
//! body is read at most once per call however many tokens need it.

pub mod render;
pub mod token;

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;

use chrono::{Local, SecondsFormat, Utc};
use http::{Request, Response};
use regex::Captures;

use crate::body::ReplayBody;
use crate::error::HttpLogError;
use token::{Token, PLACEHOLDER};

/// Rendered in place of anything read from a missing response or error.
pub const NULL: &str = "NULL";
/// Rendered in place of a body that cannot be read from its start again.
pub const NOT_LOGGEABLE: &str = "[RESPONSE_NOT_LOGGEABLE]";
/// Rendered in place of a body that looks binary.
pub const BINARY_OMITTED: &str = "[BINARY_STREAM_OMITTED]";

/// Control bytes other than tab, LF and CR, plus DEL.
pub const DEFAULT_BINARY_PATTERN: &str = r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]";

pub trait MessageFormatter: Send + Sync {
    fn format<B, R>(
        &self,
        request: &Request<B>,
        response: Option<&Response<R>>,
        error: Option<&dyn fmt::Display>,
    ) -> String
    where
        B: ReplayBody,
        R: ReplayBody;

    /// Whether formatting can read the request body. When it cannot, the
    /// middleware does not keep a handle on the body across the call.
    fn reads_request_body(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct HttpMessageFormatter {
    template: String,
    binary_pattern: regex::bytes::Regex,
    reads_request_body: bool,
}

impl HttpMessageFormatter {
    /// Apache common log format.
    pub const CLF: &'static str = "{hostname} {req.header_User-Agent} - [{date_common_log}] \"{method} {target} HTTP/{version}\" {code} {res.header_Content-Length}";
    pub const DEBUG: &'static str = ">>>>>>>>\n{request}\n<<<<<<<<\n{response}\n--------\n{error}";
    pub const DEBUG_JSON: &'static str =
        ">>>>>>>>\n{request:json}\n<<<<<<<<\n{response:json}\n--------\n{error}";
    pub const SHORT: &'static str = "[{ts}] \"{method} {target} HTTP/{version}\" {code}";

    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let reads_request_body = PLACEHOLDER
            .captures_iter(&template)
            .any(|caps| Token::parse(&caps[1]).reads_request_body());
        Self {
            template,
            binary_pattern: default_binary_pattern(),
            reads_request_body,
        }
    }

    /// Replace the pattern that marks a body as binary.
    pub fn with_binary_pattern(mut self, pattern: &str) -> Result<Self, HttpLogError> {
        self.binary_pattern =
            regex::bytes::Regex::new(pattern).map_err(|source| HttpLogError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(self)
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    fn body_text<B: ReplayBody>(&self, body: &B) -> String {
        match body.replay() {
            Err(e) => {
                tracing::trace!(error = %e, "body not replayable");
                NOT_LOGGEABLE.to_string()
            }
            Ok(bytes) if self.binary_pattern.is_match(&bytes) => BINARY_OMITTED.to_string(),
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for HttpMessageFormatter {
    fn default() -> Self {
        Self::new(Self::DEBUG)
    }
}

fn default_binary_pattern() -> regex::bytes::Regex {
    regex::bytes::Regex::new(DEFAULT_BINARY_PATTERN).expect("default binary pattern is valid")
}

impl MessageFormatter for HttpMessageFormatter {
    fn format<B, R>(
        &self,
        request: &Request<B>,
        response: Option<&Response<R>>,
        error: Option<&dyn fmt::Display>,
    ) -> String
    where
        B: ReplayBody,
        R: ReplayBody,
    {
        let exchange = Exchange {
            formatter: self,
            request,
            response,
            error,
            request_body: OnceCell::new(),
            response_body: OnceCell::new(),
        };
        let mut cache: HashMap<String, String> = HashMap::new();

        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures<'_>| {
                let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                    return String::new();
                };
                if let Some(value) = cache.get(name) {
                    return value.clone();
                }
                let value = exchange.resolve(&Token::parse(name));
                cache.insert(name.to_string(), value.clone());
                value
            })
            .into_owned()
    }

    fn reads_request_body(&self) -> bool {
        self.reads_request_body
    }
}

/// One `format` call's view of the exchange.
struct Exchange<'a, B, R> {
    formatter: &'a HttpMessageFormatter,
    request: &'a Request<B>,
    response: Option<&'a Response<R>>,
    error: Option<&'a dyn fmt::Display>,
    request_body: OnceCell<String>,
    response_body: OnceCell<String>,
}

impl<B: ReplayBody, R: ReplayBody> Exchange<'_, B, R> {
    fn request_body(&self) -> &str {
        self.request_body
            .get_or_init(|| self.formatter.body_text(self.request.body()))
    }

    fn response_body(&self, response: &Response<R>) -> &str {
        self.response_body
            .get_or_init(|| self.formatter.body_text(response.body()))
    }

    fn resolve(&self, token: &Token<'_>) -> String {
        let request = self.request;

        if token.needs_response() {
            return self
                .response
                .map_or_else(|| NULL.to_string(), |response| self.resolve_response(token, response));
        }

        match token {
            Token::Request => format!(
                "{}\r\n{}\r\n\r\n{}",
                render::request_line(request),
                render::header_block(request.headers()),
                self.request_body()
            ),
            Token::RequestJson => render::request_json(request, self.request_body()),
            Token::RequestHeaders => format!(
                "{}\r\n{}",
                render::request_line(request),
                render::header_block(request.headers())
            ),
            Token::RequestBody => self.request_body().to_string(),
            Token::IsoDate => Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            Token::CommonLogDate => Local::now().format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            Token::Method => render::method_str(request),
            Token::RequestVersion => render::version_str(request.version()).to_string(),
            Token::Uri => request.uri().to_string(),
            Token::Target => render::target(request).to_string(),
            Token::Host => render::host(request),
            Token::Hostname => sysinfo::System::host_name().unwrap_or_default(),
            Token::Error => self
                .error
                .map_or_else(|| NULL.to_string(), |e| e.to_string()),
            Token::RequestHeader(name) if name.eq_ignore_ascii_case("host") => {
                render::host(request)
            }
            Token::RequestHeader(name) => render::header_line_by_name(request.headers(), name),
            _ => String::new(),
        }
    }

    fn resolve_response(&self, token: &Token<'_>, response: &Response<R>) -> String {
        match token {
            Token::Response => format!(
                "{}\r\n{}\r\n\r\n{}",
                render::status_line(response),
                render::header_block(response.headers()),
                self.response_body(response)
            ),
            Token::ResponseJson => render::response_json(response, self.response_body(response)),
            Token::ResponseHeaders => format!(
                "{}\r\n{}",
                render::status_line(response),
                render::header_block(response.headers())
            ),
            Token::ResponseBody => self.response_body(response).to_string(),
            Token::ResponseVersion => render::version_str(response.version()).to_string(),
            Token::Code => response.status().as_u16().to_string(),
            Token::Phrase => render::reason_phrase(response).to_string(),
            Token::ResponseHeader(name) => render::header_line_by_name(response.headers(), name),
            _ => String::new(),
        }
    }
}
