#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use annotator_api::app::build_app;
use annotator_api::config::ServerConfig;
use annotator_api::state::AppState;
use annotator_core::store::TableStore;

pub const SAMPLE_CSV: &str = "frame,track_id,class_id,x1,y1,x2,y2,score\n\
                              1,5,2,0,0,10,10,0.91\n\
                              1,6,2,1,1,2,2,0.40\n\
                              2,5,2,3,3,12,12,0.88\n";

pub const MULTIPART_BOUNDARY: &str = "annotator-test-boundary";

/// A router over a fresh store rooted in a temporary directory.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<TableStore>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn annotations_path(&self) -> PathBuf {
        self.dir.path().join("annotations.csv")
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        annotations_csv: Some(root.join("annotations.csv")),
        upload_dir: root.join("uploads"),
    }
}

/// Build the application with no table loaded.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(TableStore::new());
    let state = AppState {
        config: Arc::new(test_config(dir.path())),
        store: Arc::clone(&store),
    };
    TestApp {
        app: build_app(state),
        store,
        dir,
    }
}

/// Build the application with `csv` pre-loaded from `annotations.csv`.
pub async fn build_loaded_test_app(csv: &str) -> TestApp {
    let test = build_test_app();
    let path = test.annotations_path();
    tokio::fs::write(&path, csv).await.unwrap();
    test.store.load_file(&path).await.unwrap();
    test
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, "application/json", json.to_string().into_bytes()).await
}

pub async fn post_raw(
    app: &Router,
    uri: &str,
    content_type: &str,
    body: Vec<u8>,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a single-file multipart form.
pub async fn post_file(
    app: &Router,
    uri: &str,
    field: &str,
    file_name: &str,
    content: &[u8],
) -> Response<Body> {
    let mut body = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    post_raw(
        app,
        uri,
        &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        body,
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
