//! `httplog preview` — run a synthetic exchange through the middleware.
//!
//! Builds a request from the command line, answers it with a stub
//! downstream service (or fails it with `--fail`) and lets the configured
//! [`HttpLogger`] log the exchange through the tracing subscriber.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Request, Response, StatusCode};
use tower::{service_fn, Layer, ServiceExt};

use crate::body::Body;
use crate::cli::PreviewArgs;
use crate::config::{self, model::Config};
use crate::error::HttpLogError;
use crate::logging;
use crate::middleware::{HttpLogLayer, HttpLogger};
use crate::sink::TracingSink;

pub async fn execute(args: PreviewArgs) -> Result<(), HttpLogError> {
    let format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, format);

    let mut config = match args.config {
        Some(ref path) => config::load(path)?,
        None => Config::default(),
    };
    if let Some(preset) = args.preset {
        config.preset = Some(preset);
        config.template = None;
    }
    if let Some(template) = args.template {
        config.preset = None;
        config.template = Some(template);
    }

    let logger = HttpLogger::from_config(&config, TracingSink)?;
    let request = build_request(
        &args.method,
        &args.uri,
        &args.headers,
        args.body.unwrap_or_default(),
    )?;

    let status = StatusCode::from_u16(args.status).map_err(http::Error::from)?;
    let response_headers = parse_headers(&args.response_headers)?;
    let response_body = args.response_body.unwrap_or_default();
    let fail = args.fail;

    let downstream = service_fn(move |_request: Request<Body>| {
        let outcome = match fail {
            Some(ref message) => Err(std::io::Error::other(message.clone())),
            None => {
                let mut response = Response::new(Body::from(response_body.clone()));
                *response.status_mut() = status;
                *response.headers_mut() = response_headers.clone();
                Ok(response)
            }
        };
        async move { outcome }
    });

    let service = HttpLogLayer::new(logger).layer(downstream);
    match service.oneshot(request).await {
        Ok(response) => {
            tracing::debug!(status = %response.status(), "downstream responded");
        }
        Err(e) => {
            eprintln!("downstream failed: {e}");
        }
    }
    Ok(())
}

fn build_request(
    method: &str,
    uri: &str,
    headers: &[String],
    body: String,
) -> Result<Request<Body>, HttpLogError> {
    let mut request = Request::builder()
        .method(method.trim().to_ascii_uppercase().as_str())
        .uri(uri)
        .body(Body::from(body))?;
    *request.headers_mut() = parse_headers(headers)?;
    Ok(request)
}

/// Parse repeated `Name: value` arguments into a header map. Repeated
/// names keep every value.
fn parse_headers(raw: &[String]) -> Result<HeaderMap, HttpLogError> {
    let mut headers = HeaderMap::new();
    for line in raw {
        let invalid = || HttpLogError::InvalidHeader(line.clone());
        let (name, value) = line.split_once(':').ok_or_else(invalid)?;
        let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
        headers.append(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_headers() {
        let headers = parse_headers(&[
            "Accept: text/html".to_string(),
            "X-Tag: a".to_string(),
            "x-tag: b".to_string(),
        ])
        .unwrap();
        assert_eq!(headers["accept"], "text/html");
        assert_eq!(headers.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn header_without_colon_is_rejected() {
        let err = parse_headers(&["Accept text/html".to_string()]).unwrap_err();
        assert!(matches!(err, HttpLogError::InvalidHeader(_)));
    }

    #[test]
    fn header_value_may_contain_colons() {
        let headers = parse_headers(&["Host: example.com:8080".to_string()]).unwrap();
        assert_eq!(headers["host"], "example.com:8080");
    }

    #[test]
    fn request_method_is_normalized() {
        let request = build_request(" post ", "/submit?x=1", &[], "hello".into()).unwrap();
        assert_eq!(request.method(), "POST");
        assert_eq!(request.uri().query(), Some("x=1"));
    }

    #[test]
    fn bad_uri_is_an_http_error() {
        let err = build_request("GET", "not a uri", &[], String::new()).unwrap_err();
        assert!(matches!(err, HttpLogError::Http(_)));
    }
}
