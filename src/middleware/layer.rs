//! Tower integration.
//!
//! [`HttpLogLayer`] wraps any `Service<Request<B>, Response = Response<RB>>`
//! in an [`HttpLogService`] that logs each call through a shared
//! [`HttpLogger`]. The inner service's error type passes through as is,
//! so the layer drops into `axum::Router::layer` (where it is
//! `Infallible`) as well as into fallible client stacks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{Request, Response};
use tower::{Layer, Service};

use super::HttpLogger;
use crate::body::ReplayBody;
use crate::format::{HttpMessageFormatter, MessageFormatter};
use crate::sink::{LogSink, TracingSink};

pub struct HttpLogLayer<F = HttpMessageFormatter, K = TracingSink> {
    logger: Arc<HttpLogger<F, K>>,
}

impl<F, K> HttpLogLayer<F, K> {
    pub fn new(logger: HttpLogger<F, K>) -> Self {
        Self {
            logger: Arc::new(logger),
        }
    }

    /// Share a logger, and with it the status level cache, across layers.
    pub const fn from_shared(logger: Arc<HttpLogger<F, K>>) -> Self {
        Self { logger }
    }
}

impl<F, K> Clone for HttpLogLayer<F, K> {
    fn clone(&self) -> Self {
        Self {
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<S, F, K> Layer<S> for HttpLogLayer<F, K> {
    type Service = HttpLogService<S, F, K>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpLogService {
            inner,
            logger: Arc::clone(&self.logger),
        }
    }
}

pub struct HttpLogService<S, F = HttpMessageFormatter, K = TracingSink> {
    inner: S,
    logger: Arc<HttpLogger<F, K>>,
}

impl<S: Clone, F, K> Clone for HttpLogService<S, F, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<S: fmt::Debug, F, K> fmt::Debug for HttpLogService<S, F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpLogService")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S, F, K, B, RB> Service<Request<B>> for HttpLogService<S, F, K>
where
    S: Service<Request<B>, Response = Response<RB>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    B: ReplayBody + Send + 'static,
    RB: ReplayBody + Send + 'static,
    F: MessageFormatter + 'static,
    K: LogSink + 'static,
{
    type Response = Response<RB>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        // The clone is not guaranteed ready; keep the one poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let logger = Arc::clone(&self.logger);

        Box::pin(async move { logger.handle(request, |request| inner.call(request)).await })
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use tower::{service_fn, ServiceExt};
    use tracing::Level;

    use super::*;
    use crate::sink::MemorySink;

    #[tokio::test]
    async fn wraps_service_and_logs() {
        let sink = Arc::new(MemorySink::new());
        let logger = HttpLogger::new(
            HttpMessageFormatter::new(HttpMessageFormatter::SHORT),
            Arc::clone(&sink),
        );
        let service = HttpLogLayer::new(logger).layer(service_fn(|_req: Request<String>| async {
            Ok::<_, Infallible>(Response::new(String::from("ok")))
        }));

        let request = Request::builder().uri("/").body(String::new()).unwrap();
        let response = service.oneshot(request).await.unwrap();

        assert_eq!(response.body(), "ok");
        assert!(sink.has_record_containing(Level::INFO, "\"GET / HTTP/1.1\" 200"));
    }

    #[tokio::test]
    async fn layers_built_from_shared_logger_share_cache() {
        let logger = Arc::new(HttpLogger::new(
            HttpMessageFormatter::new("{code}"),
            MemorySink::new(),
        ));
        let layer = HttpLogLayer::from_shared(Arc::clone(&logger));
        let service = layer.layer(service_fn(|_req: Request<()>| async {
            Ok::<_, Infallible>(Response::builder().status(418).body(()).unwrap())
        }));

        service.oneshot(Request::new(())).await.unwrap();
        assert_eq!(logger.sink().count(Level::ERROR), 1);
    }
}
