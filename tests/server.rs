//! Integration tests running the logging layer inside a real axum server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use httplog::format::NOT_LOGGEABLE;
use httplog::{HttpLogLayer, HttpLogger, HttpMessageFormatter, LevelMap, MemorySink};
use tracing::Level;

async fn start_test_server(
    logger: HttpLogger<HttpMessageFormatter, Arc<MemorySink>>,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let router = Router::new()
        .route("/", get(|| async { "hello" }))
        .route("/echo", post(|body: String| async move { body }))
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(HttpLogLayer::new(logger));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

fn logger(
    template: &str,
    levels: LevelMap,
) -> (HttpLogger<HttpMessageFormatter, Arc<MemorySink>>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = HttpLogger::with_levels(
        HttpMessageFormatter::new(template),
        Arc::clone(&sink),
        levels,
    );
    (logger, sink)
}

#[tokio::test]
async fn logs_each_request_once() {
    let (logger, sink) = logger(HttpMessageFormatter::SHORT, LevelMap::default());
    let (addr, shutdown) = start_test_server(logger).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "hello");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::INFO);
    assert!(records[0].message.contains("\"GET / HTTP/1.1\" 200"));
    assert!(records[0].context.milliseconds.is_some());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn status_picks_the_level() {
    let levels = LevelMap::empty()
        .rule(Level::INFO, (200, 399))
        .rule(Level::WARN, (400, 499))
        .rule(Level::ERROR, (500, 599));
    let (logger, sink) = logger("{method} {target} {code} {phrase}", levels);
    let (addr, shutdown) = start_test_server(logger).await;

    let resp = reqwest::get(format!("http://{addr}/missing")).await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(sink.count(Level::WARN), 1);
    assert!(sink.has_record_containing(Level::WARN, "GET /missing 404 Not Found"));

    sink.clear();
    let resp = reqwest::get(format!("http://{addr}/boom")).await.unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(sink.count(Level::ERROR), 1);
    assert!(!sink.has_records(Level::WARN));
    assert!(!sink.has_records(Level::INFO));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn streamed_bodies_are_not_loggeable() {
    let (logger, sink) = logger("{req.body}|{res.body}", LevelMap::default());
    let (addr, shutdown) = start_test_server(logger).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/echo"))
        .body("ping")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.text().await.unwrap(), "ping");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].message,
        format!("{NOT_LOGGEABLE}|{NOT_LOGGEABLE}")
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn request_headers_are_available() {
    let (logger, sink) = logger("{req.header_User-Agent} {host}", LevelMap::default());
    let (addr, shutdown) = start_test_server(logger).await;

    let client = reqwest::Client::builder()
        .user_agent("httplog-test/1.0")
        .build()
        .unwrap();
    client.get(format!("http://{addr}/")).send().await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, format!("httplog-test/1.0 {addr}"));

    let _ = shutdown.send(());
}
