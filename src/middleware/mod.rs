//! The logging middleware.
//!
//! [`HttpLogger`] wraps one downstream call: it times the call, formats the
//! exchange with its [`MessageFormatter`], picks a level from the response
//! status through its [`LevelMap`] and hands the line to its [`LogSink`].
//! A failed call is logged at `ERROR` and its error is returned untouched.
//!
//! The downstream call is a closure, sync ([`HttpLogger::invoke`]) or
//! async ([`HttpLogger::handle`]). [`layer`] packages the same behavior as
//! a `tower` layer for `axum` and other tower stacks.

pub mod layer;
pub mod level;

use std::fmt;
use std::future::Future;
use std::time::Instant;

use http::{Request, Response, StatusCode};
use tracing::Level;

use crate::body::ReplayBody;
use crate::config::model::Config;
use crate::error::HttpLogError;
use crate::format::{HttpMessageFormatter, MessageFormatter};
use crate::sink::{LogContext, LogSink, TracingSink};

pub use layer::{HttpLogLayer, HttpLogService};
pub use level::{LevelCache, LevelMap, StatusMatch};

#[derive(Debug)]
pub struct HttpLogger<F = HttpMessageFormatter, K = TracingSink> {
    formatter: F,
    sink: K,
    levels: LevelMap,
    cache: LevelCache,
}

impl<F: MessageFormatter, K: LogSink> HttpLogger<F, K> {
    /// A logger using the default level map.
    pub fn new(formatter: F, sink: K) -> Self {
        Self::with_levels(formatter, sink, LevelMap::default())
    }

    pub fn with_levels(formatter: F, sink: K, levels: LevelMap) -> Self {
        Self {
            formatter,
            sink,
            levels,
            cache: LevelCache::new(),
        }
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn levels(&self) -> &LevelMap {
        &self.levels
    }

    /// The level a response with this status logs at.
    pub fn level_for(&self, status: StatusCode) -> Level {
        self.cache.resolve(status.as_u16(), &self.levels)
    }

    /// Run a synchronous downstream call and log its outcome.
    pub fn invoke<B, RB, E, N>(&self, request: Request<B>, next: N) -> Result<Response<RB>, E>
    where
        B: ReplayBody,
        RB: ReplayBody,
        E: fmt::Display,
        N: FnOnce(Request<B>) -> Result<Response<RB>, E>,
    {
        let start = Instant::now();
        let logged = snapshot(&request, self.formatter.reads_request_body());
        let outcome = next(request);
        self.record(&logged, start, outcome)
    }

    /// Run an asynchronous downstream call and log its outcome.
    pub async fn handle<B, RB, E, N, Fut>(
        &self,
        request: Request<B>,
        next: N,
    ) -> Result<Response<RB>, E>
    where
        B: ReplayBody,
        RB: ReplayBody,
        E: fmt::Display,
        N: FnOnce(Request<B>) -> Fut,
        Fut: Future<Output = Result<Response<RB>, E>>,
    {
        let start = Instant::now();
        let logged = snapshot(&request, self.formatter.reads_request_body());
        let outcome = next(request).await;
        self.record(&logged, start, outcome)
    }

    fn record<B, RB, E>(
        &self,
        request: &Request<Option<B>>,
        start: Instant,
        outcome: Result<Response<RB>, E>,
    ) -> Result<Response<RB>, E>
    where
        B: ReplayBody,
        RB: ReplayBody,
        E: fmt::Display,
    {
        match outcome {
            Ok(response) => {
                let milliseconds = elapsed_millis(start);
                let level = self.level_for(response.status());
                let message = self.formatter.format(request, Some(&response), None);
                self.sink.log(
                    level,
                    &message,
                    &LogContext {
                        milliseconds: Some(milliseconds),
                    },
                );
                Ok(response)
            }
            Err(error) => {
                let message = self.formatter.format(
                    request,
                    None::<&Response<RB>>,
                    Some(&error as &dyn fmt::Display),
                );
                self.sink.log(Level::ERROR, &message, &LogContext::default());
                Err(error)
            }
        }
    }
}

impl<K: LogSink> HttpLogger<HttpMessageFormatter, K> {
    /// Build a logger from a validated config.
    pub fn from_config(config: &Config, sink: K) -> Result<Self, HttpLogError> {
        crate::config::validation::validate(config)
            .map_err(|errors| HttpLogError::ConfigValidation { errors })?;
        Ok(Self::with_levels(
            config.formatter()?,
            sink,
            config.level_map()?,
        ))
    }
}

impl Default for HttpLogger {
    fn default() -> Self {
        Self::new(HttpMessageFormatter::default(), TracingSink)
    }
}

/// A copy of the request head, plus a second handle onto its body when
/// `with_body` is set, taken before the request is handed downstream.
fn snapshot<B: ReplayBody>(request: &Request<B>, with_body: bool) -> Request<Option<B>> {
    let body = if with_body { request.body().share() } else { None };
    let mut logged = Request::new(body);
    *logged.method_mut() = request.method().clone();
    *logged.uri_mut() = request.uri().clone();
    *logged.version_mut() = request.version();
    *logged.headers_mut() = request.headers().clone();
    logged
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn elapsed_millis(start: Instant) -> u64 {
    (start.elapsed().as_secs_f64() * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sink::MemorySink;

    fn logger(template: &str) -> (HttpLogger<HttpMessageFormatter, Arc<MemorySink>>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = HttpLogger::new(HttpMessageFormatter::new(template), Arc::clone(&sink));
        (logger, sink)
    }

    fn request() -> Request<String> {
        Request::builder()
            .uri("/items?page=2")
            .body("payload".to_string())
            .unwrap()
    }

    #[test]
    fn snapshot_copies_head_and_shares_body() {
        let original = Request::builder()
            .method("POST")
            .uri("/upload")
            .header("x-trace", "abc")
            .body(String::from("data"))
            .unwrap();
        let copy = snapshot(&original, true);
        assert_eq!(copy.method(), "POST");
        assert_eq!(copy.uri(), "/upload");
        assert_eq!(copy.headers()["x-trace"], "abc");
        assert_eq!(copy.body().as_deref(), Some("data"));
    }

    #[test]
    fn snapshot_without_body_leaves_it_alone() {
        let copy = snapshot(&request(), false);
        assert_eq!(copy.uri(), "/items?page=2");
        assert!(copy.body().is_none());
    }

    #[test]
    fn success_logs_at_mapped_level_with_duration() {
        let (logger, sink) = logger("{method} {target} {code}");
        let response = logger
            .invoke(request(), |_| {
                Ok::<_, std::io::Error>(Response::builder().status(201).body(()).unwrap())
            })
            .unwrap();
        assert_eq!(response.status(), 201);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::INFO);
        assert_eq!(records[0].message, "GET /items?page=2 201");
        assert!(records[0].context.milliseconds.is_some());
    }

    #[test]
    fn downstream_sees_original_request() {
        let (logger, _sink) = logger("{req.body}");
        let _ = logger.invoke(request(), |req| {
            assert_eq!(req.body(), "payload");
            assert_eq!(req.uri(), "/items?page=2");
            Ok::<_, std::io::Error>(Response::new(()))
        });
    }

    #[test]
    fn failure_logs_error_once_and_returns_same_error() {
        let (logger, sink) = logger("{code} {error}");
        let result: Result<Response<()>, std::io::Error> = logger.invoke(request(), |_| {
            Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out"))
        });

        let err = result.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "upstream timed out");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::ERROR);
        assert_eq!(records[0].message, "NULL upstream timed out");
        assert_eq!(records[0].context.milliseconds, None);
    }

    #[test]
    fn level_for_is_stable() {
        let (logger, _sink) = logger("{code}");
        assert_eq!(logger.level_for(StatusCode::NOT_FOUND), Level::ERROR);
        assert_eq!(logger.level_for(StatusCode::NOT_FOUND), Level::ERROR);
        assert_eq!(logger.level_for(StatusCode::OK), Level::INFO);
    }

    #[tokio::test]
    async fn handle_awaits_downstream() {
        let (logger, sink) = logger("{code}");
        let response = logger
            .handle(request(), |_| async {
                Ok::<_, std::io::Error>(Response::builder().status(404).body(()).unwrap())
            })
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert!(sink.has_record_containing(Level::ERROR, "404"));
    }
}
