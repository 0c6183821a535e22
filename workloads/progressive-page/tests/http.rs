use std::path::PathBuf;
use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use tower::ServiceExt;

use edge_sdk::edge_core::{LatencyRange, SectionLatencies, ServerConfig};
use progressive_page::{app, AppState, LogSettings};

/// Router with fixed section latencies in milliseconds.
fn router_with(profile: u64, products: u64, categories: u64) -> Router {
    let config = ServerConfig {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/static"),
        latency: SectionLatencies {
            profile: LatencyRange::fixed(profile),
            products: LatencyRange::fixed(products),
            categories: LatencyRange::fixed(categories),
        },
        ..ServerConfig::default()
    };
    app(AppState::new(config, LogSettings::default()).unwrap())
}

/// Profile is slowest, so it is the one everything else waits on.
fn router() -> Router {
    router_with(40, 5, 20)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn fills(html: &str, id: &str) -> usize {
    html.find(&format!("data-fills=\"{}\"", id))
        .unwrap_or_else(|| panic!("{} not filled", id))
}

#[tokio::test]
async fn test_stream_sends_shell_then_sections_in_order() {
    let response = router().oneshot(get("/stream")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    assert_eq!(response.headers()["x-render-mode"], "streaming");
    assert!(response.headers().contains_key("x-request-id"));

    let chunks: Vec<String> = response
        .into_body()
        .into_data_stream()
        .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
        .collect()
        .await;

    // Shell, three sections, closing markup.
    assert_eq!(chunks.len(), 5);
    assert!(chunks[0].starts_with("<!DOCTYPE html>"));
    for id in ["profile", "products", "categories"] {
        assert!(chunks[0].contains(&format!("data-placeholder=\"{}\"", id)));
    }
    assert!(!chunks[0].contains("data-fills=\""));
    assert!(chunks[1].contains("data-fills=\"profile\""));
    assert!(chunks[2].contains("data-fills=\"products\""));
    assert!(chunks[3].contains("data-fills=\"categories\""));
    assert!(chunks[4].ends_with("</html>\n"));
}

#[tokio::test]
async fn test_shell_arrives_before_slowest_section() {
    let start = Instant::now();
    let response = router_with(500, 5, 20).oneshot(get("/stream")).await.unwrap();
    let mut body = response.into_body().into_data_stream();

    let shell = body.next().await.unwrap().unwrap();
    let shell_at = start.elapsed();
    let shell = String::from_utf8(shell.to_vec()).unwrap();
    assert!(shell.contains("data-placeholder=\"profile\""));
    assert!(!shell.contains("data-fills=\""));
    assert!(
        shell_at < Duration::from_millis(400),
        "shell took {:?}",
        shell_at
    );

    let profile = body.next().await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&profile).contains("data-fills=\"profile\""));
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_root_streams() {
    let response = router().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-render-mode"], "streaming");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(fills(&html, "profile") < fills(&html, "products"));
    assert!(fills(&html, "products") < fills(&html, "categories"));
    assert!(html.contains("Welcome back!"));
}

#[tokio::test]
async fn test_nostream_sends_whole_page() {
    let response = router().oneshot(get("/nostream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-render-mode"], "buffered");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(!html.contains("data-placeholder"));
    assert!(fills(&html, "profile") < fills(&html, "products"));
    assert!(fills(&html, "products") < fills(&html, "categories"));
    assert!(html.contains("Product 6 Description"));
    assert!(html.contains("Category 2"));
    assert!(html.contains("<title>Hello World</title>"));
    assert!(html.ends_with("</html>\n"));
}

#[tokio::test]
async fn test_static_files() {
    let response = router().oneshot(get("/static/site.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("color"));
}

#[tokio::test]
async fn test_unknown_route() {
    let response = router().oneshot(get("/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_inverted_latency_rejected() {
    let mut config = ServerConfig::default();
    config.latency.products = LatencyRange::new(10, 5);
    assert!(AppState::new(config, LogSettings::default()).is_err());
}
