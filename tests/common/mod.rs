//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

use onboard_backend::config::AppConfig;
use onboard_backend::http::ApiError;

pub const INDEX_HTML: &str = "<!doctype html><html><body><div id=\"root\"></div></body></html>";

/// A frontend build directory with an entry document and one bundle.
pub fn frontend_build() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
    fs::create_dir_all(dir.path().join("static/js")).unwrap();
    fs::write(dir.path().join("static/js/main.js"), "console.log('app');").unwrap();
    dir
}

/// Asset root with `uploads/`, `documents/` and `assets/` populated.
pub fn asset_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (sub, file, body) in [
        ("uploads", "resume.txt", "resume"),
        ("documents", "policy.txt", "policy"),
        ("assets", "logo.svg", "<svg/>"),
    ] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join(file), body).unwrap();
    }
    dir
}

/// Split-mode configuration (no single-service flag, no tier).
pub fn split_config(assets: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.assets.root = assets.to_path_buf();
    config
}

/// Combined-mode configuration serving `build`.
pub fn combined_config(assets: &Path, build: &Path) -> AppConfig {
    let mut config = split_config(assets);
    config.server.environment = "production".into();
    config.frontend.build_dir = build.to_path_buf();
    config
}

/// Sub-router that fails in every way a handler can.
pub fn failing_router() -> Router {
    Router::new()
        .route("/ok", get(|| async { Json(json!({ "success": true })) }))
        .route(
            "/conflict",
            get(|| async { Err::<(), _>(ApiError::with_status(StatusCode::CONFLICT, "Already enrolled")) }),
        )
        .route(
            "/internal",
            get(|| async {
                let io = std::io::Error::new(std::io::ErrorKind::Other, "collection unavailable");
                Err::<(), _>(ApiError::internal(io))
            }),
        )
        .route(
            "/blank",
            get(|| async { Err::<(), _>(ApiError::with_status(StatusCode::BAD_GATEWAY, "")) }),
        )
        .route(
            "/panic",
            get(|| async {
                if true {
                    panic!("progress document corrupted");
                }
                "unreachable"
            }),
        )
        .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        )
}

/// Sub-router answering only at its root.
pub fn root_only_router(body: &'static str) -> Router {
    Router::new().route("/", get(move || async move { body }))
}

/// Log lines captured from a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Run `f` with a subscriber writing into this buffer.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// Drive `router` with one request.
pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply { status, headers, body }
}

pub async fn get_path(router: &Router, path: &str) -> Reply {
    send(router, Request::builder().uri(path).body(Body::empty()).unwrap()).await
}

pub fn request(method: Method, path: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(path)
}
