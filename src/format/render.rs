//! Rendering of HTTP message parts: start lines, header blocks, JSON views.

use std::borrow::Cow;
use std::fmt::Write;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Request, Response, Version};
use serde::ser::{Serialize, Serializer};

#[must_use]
pub fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[must_use]
pub fn method_str<B>(request: &Request<B>) -> String {
    request.method().as_str().trim().to_ascii_uppercase()
}

/// Path and query as they appear on the request line.
#[must_use]
pub fn target<B>(request: &Request<B>) -> &str {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("/")
}

#[must_use]
pub fn request_line<B>(request: &Request<B>) -> String {
    let line = format!("{} {}", method_str(request), target(request));
    format!("{} HTTP/{}", line.trim(), version_str(request.version()))
}

#[must_use]
pub fn status_line<B>(response: &Response<B>) -> String {
    format!(
        "HTTP/{} {} {}",
        version_str(response.version()),
        response.status().as_u16(),
        reason_phrase(response)
    )
}

#[must_use]
pub fn reason_phrase<B>(response: &Response<B>) -> &'static str {
    response.status().canonical_reason().unwrap_or("")
}

fn value_str(value: &HeaderValue) -> Cow<'_, str> {
    String::from_utf8_lossy(value.as_bytes())
}

/// All values of one header, comma-joined. Empty when absent.
#[must_use]
pub fn header_line(headers: &HeaderMap, name: &HeaderName) -> String {
    headers
        .get_all(name)
        .iter()
        .map(value_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Like [`header_line`] but for a name taken from a template. Names that
/// are not valid header names resolve to nothing.
#[must_use]
pub fn header_line_by_name(headers: &HeaderMap, name: &str) -> String {
    HeaderName::from_bytes(name.as_bytes())
        .map(|name| header_line(headers, &name))
        .unwrap_or_default()
}

/// The `Host` header, or the URI authority when the header is absent, as
/// on requests built for a client that have not reached the connection yet.
#[must_use]
pub fn host<B>(request: &Request<B>) -> String {
    let header = header_line(request.headers(), &http::header::HOST);
    if !header.is_empty() {
        return header;
    }
    request
        .uri()
        .authority()
        .map(|authority| authority.as_str().to_string())
        .unwrap_or_default()
}

/// One `name: v1, v2` line per header name, CRLF separated.
#[must_use]
pub fn header_block(headers: &HeaderMap) -> String {
    let mut block = String::new();
    for name in headers.keys() {
        // write! to String is infallible
        let _ = write!(block, "{}: {}\r\n", name, header_line(headers, name));
    }
    block.trim_end().to_string()
}

struct HeadersJson<'a>(&'a HeaderMap);

impl Serialize for HeadersJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.keys().map(|name| {
            let values: Vec<Cow<'_, str>> = self.0.get_all(name).iter().map(value_str).collect();
            (name.as_str(), values)
        }))
    }
}

#[derive(serde::Serialize)]
struct RequestJson<'a> {
    method: String,
    uri: String,
    path: &'a str,
    version: &'static str,
    headers: HeadersJson<'a>,
    body: &'a str,
}

#[derive(serde::Serialize)]
struct ResponseJson<'a> {
    version: &'static str,
    status: String,
    headers: HeadersJson<'a>,
    body: &'a str,
}

#[must_use]
pub fn request_json<B>(request: &Request<B>, body: &str) -> String {
    let view = RequestJson {
        method: method_str(request),
        uri: request.uri().to_string(),
        path: target(request),
        version: version_str(request.version()),
        headers: HeadersJson(request.headers()),
        body,
    };
    serde_json::to_string(&view).unwrap_or_default()
}

#[must_use]
pub fn response_json<B>(response: &Response<B>, body: &str) -> String {
    let view = ResponseJson {
        version: version_str(response.version()),
        status: format!("{} {}", response.status().as_u16(), reason_phrase(response)),
        headers: HeadersJson(response.headers()),
        body,
    };
    serde_json::to_string(&view).unwrap_or_default()
}
