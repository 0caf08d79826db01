//! The closed token vocabulary recognised inside `{...}` placeholders.

use std::sync::LazyLock;

use regex::Regex;

/// Matches `{token}`, tolerating whitespace inside the braces.
pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*([A-Za-z0-9_\-:.]+)\s*\}").expect("placeholder pattern is valid")
});

const REQUEST_HEADER_PREFIX: &str = "req.header_";
const RESPONSE_HEADER_PREFIX: &str = "res.header_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Request,
    Response,
    RequestJson,
    ResponseJson,
    RequestHeaders,
    ResponseHeaders,
    RequestBody,
    ResponseBody,
    /// `ts` and `date_iso_8601`.
    IsoDate,
    CommonLogDate,
    Method,
    /// `version` and `req.version`.
    RequestVersion,
    ResponseVersion,
    /// `uri` and `url`.
    Uri,
    Target,
    Host,
    Hostname,
    Code,
    Phrase,
    Error,
    RequestHeader(&'a str),
    ResponseHeader(&'a str),
    Unknown,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        match name {
            "request" => Self::Request,
            "response" => Self::Response,
            "request:json" => Self::RequestJson,
            "response:json" => Self::ResponseJson,
            "req.headers" => Self::RequestHeaders,
            "res.headers" => Self::ResponseHeaders,
            "req.body" => Self::RequestBody,
            "res.body" => Self::ResponseBody,
            "ts" | "date_iso_8601" => Self::IsoDate,
            "date_common_log" => Self::CommonLogDate,
            "method" => Self::Method,
            "version" | "req.version" => Self::RequestVersion,
            "res.version" => Self::ResponseVersion,
            "uri" | "url" => Self::Uri,
            "target" => Self::Target,
            "host" => Self::Host,
            "hostname" => Self::Hostname,
            "code" => Self::Code,
            "phrase" => Self::Phrase,
            "error" => Self::Error,
            other => {
                if let Some(header) = other.strip_prefix(REQUEST_HEADER_PREFIX) {
                    Self::RequestHeader(header)
                } else if let Some(header) = other.strip_prefix(RESPONSE_HEADER_PREFIX) {
                    Self::ResponseHeader(header)
                } else {
                    Self::Unknown
                }
            }
        }
    }

    /// Whether the token renders the request body.
    #[must_use]
    pub const fn reads_request_body(&self) -> bool {
        matches!(self, Self::Request | Self::RequestJson | Self::RequestBody)
    }

    /// Whether the token reads from the response; these render `NULL`
    /// when there is none.
    #[must_use]
    pub const fn needs_response(&self) -> bool {
        matches!(
            self,
            Self::Response
                | Self::ResponseJson
                | Self::ResponseHeaders
                | Self::ResponseBody
                | Self::ResponseVersion
                | Self::Code
                | Self::Phrase
                | Self::ResponseHeader(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_share_a_variant() {
        assert_eq!(Token::parse("ts"), Token::IsoDate);
        assert_eq!(Token::parse("date_iso_8601"), Token::IsoDate);
        assert_eq!(Token::parse("uri"), Token::parse("url"));
        assert_eq!(Token::parse("version"), Token::parse("req.version"));
    }

    #[test]
    fn header_prefixes() {
        assert_eq!(
            Token::parse("req.header_User-Agent"),
            Token::RequestHeader("User-Agent")
        );
        assert_eq!(
            Token::parse("res.header_Content-Length"),
            Token::ResponseHeader("Content-Length")
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(Token::parse("METHOD"), Token::Unknown);
        assert_eq!(Token::parse("Req.header_Host"), Token::Unknown);
    }

    #[test]
    fn placeholder_tolerates_inner_whitespace() {
        let caps = PLACEHOLDER.captures("{  code }").unwrap();
        assert_eq!(&caps[1], "code");
        assert!(PLACEHOLDER.captures("{code").is_none());
        assert!(PLACEHOLDER.captures("{co de}").is_none());
    }

    #[test]
    fn request_body_tokens() {
        assert!(Token::parse("request").reads_request_body());
        assert!(Token::parse("request:json").reads_request_body());
        assert!(Token::parse("req.body").reads_request_body());
        assert!(!Token::parse("req.headers").reads_request_body());
        assert!(!Token::parse("res.body").reads_request_body());
    }

    #[test]
    fn response_tokens_need_response() {
        assert!(Token::parse("code").needs_response());
        assert!(Token::parse("res.header_Date").needs_response());
        assert!(!Token::parse("req.body").needs_response());
        assert!(!Token::parse("error").needs_response());
    }
}
