//! テスト用の偽バックエンド
//!
//! アップロードされたファイルの中身で応答を切り替える:
//! - `"cat,dog"` → `{"detected": ["cat", "dog"]}`
//! - `"slow:..."` → 300ms 待ってから残りを同様に処理
//! - `"invalid"` → 400 `{"error": "Invalid image"}`
//! - `"nofield"` → `{}`

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const FRAME_WIDTH: u32 = 8;
pub const FRAME_HEIGHT: u32 = 6;
pub const FRAME_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollMode {
    #[default]
    Ok,
    NotJson,
    ServerError,
}

/// `/video` の終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoMode {
    /// 送り終えても接続を閉じない
    #[default]
    Endless,
    /// 終端境界なしで接続を閉じる
    Close,
    /// フレームの後に通信エラー
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Default)]
pub struct FakeBackend {
    pub detections: Mutex<Vec<String>>,
    pub poll_mode: Mutex<PollMode>,
    pub poll_count: AtomicUsize,
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    pub video_unavailable: AtomicBool,
    pub video_mode: Mutex<VideoMode>,
    pub video_size: Mutex<Option<(u32, u32)>>,
}

impl FakeBackend {
    pub fn set_detections(&self, labels: &[&str]) {
        *self.detections.lock().unwrap() = labels.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_poll_mode(&self, mode: PollMode) {
        *self.poll_mode.lock().unwrap() = mode;
    }

    pub fn set_video_mode(&self, mode: VideoMode) {
        *self.video_mode.lock().unwrap() = mode;
    }

    pub fn polls(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<FakeBackend>,
    task: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn_backend() -> TestServer {
    let backend = Arc::new(FakeBackend::default());
    let app = Router::new()
        .route("/", get(index))
        .route("/detections", get(detections))
        .route("/upload/", post(upload))
        .route("/video", get(video))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind addr");
    let addr = listener.local_addr().expect("local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        backend,
        task,
    }
}

/// 何も待ち受けていないURL
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind addr");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({"message": "Go to /video?width=640&height=480 for stream"}))
}

async fn detections(State(backend): State<Arc<FakeBackend>>) -> Response {
    backend.poll_count.fetch_add(1, Ordering::SeqCst);
    let mode = *backend.poll_mode.lock().unwrap();
    match mode {
        PollMode::Ok => {
            let labels = backend.detections.lock().unwrap().clone();
            Json(json!({"detected_objects": labels})).into_response()
        }
        PollMode::NotJson => (StatusCode::OK, "<html>not json</html>").into_response(),
        PollMode::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn upload(State(backend): State<Arc<FakeBackend>>, mut multipart: Multipart) -> Response {
    let mut data = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let received = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            size: 0,
        };
        let is_file = received.field == "file";
        let bytes = field.bytes().await.unwrap_or_default();
        backend.uploads.lock().unwrap().push(ReceivedUpload {
            size: bytes.len(),
            ..received
        });
        if is_file {
            data = Some(bytes);
        }
    }

    let Some(data) = data else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "file missing"})))
            .into_response();
    };

    let mut text = String::from_utf8_lossy(&data).to_string();
    if let Some(rest) = text.strip_prefix("slow:") {
        let rest = rest.to_string();
        tokio::time::sleep(Duration::from_millis(300)).await;
        text = rest;
    }

    match text.as_str() {
        "invalid" => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid image"}))).into_response()
        }
        "nofield" => Json(json!({})).into_response(),
        "" => Json(json!({"detected": []})).into_response(),
        labels => {
            let labels: Vec<&str> = labels.split(',').collect();
            Json(json!({"detected": labels})).into_response()
        }
    }
}

#[derive(Deserialize)]
struct VideoQuery {
    width: u32,
    height: u32,
}

async fn video(State(backend): State<Arc<FakeBackend>>, Query(query): Query<VideoQuery>) -> Response {
    *backend.video_size.lock().unwrap() = Some((query.width, query.height));
    if backend.video_unavailable.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "camera busy").into_response();
    }

    let jpeg = test_jpeg();
    let parts: Vec<Result<Bytes, std::io::Error>> = (0..FRAME_COUNT)
        .map(|_| {
            let mut part = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
            part.extend_from_slice(&jpeg);
            part.extend_from_slice(b"\r\n");
            Ok(Bytes::from(part))
        })
        .collect();
    let frames = futures::stream::iter(parts);
    // 最後のフレームを確定させる境界
    let closing = futures::stream::once(async { Ok::<_, std::io::Error>(Bytes::from_static(b"--frame\r\n")) });

    let mode = *backend.video_mode.lock().unwrap();
    let stream = match mode {
        // 本物のカメラ同様、送り終えても接続は閉じない
        VideoMode::Endless => frames
            .chain(closing)
            .chain(futures::stream::pending::<Result<Bytes, std::io::Error>>())
            .boxed(),
        // 本物のバックエンドはジェネレーターが終わると境界なしで閉じる
        VideoMode::Close => frames.boxed(),
        VideoMode::Fail => frames
            .chain(closing)
            .chain(futures::stream::once(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Err::<Bytes, _>(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "camera lost"))
            }))
            .boxed(),
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "multipart/x-mixed-replace; boundary=frame")
        .body(Body::from_stream(stream))
        .unwrap()
}

pub fn test_jpeg() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, image::Rgb([0, 200, 0]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf
}

/// 中身を指定した一時ファイル（アップロード用）
pub fn upload_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write upload file");
    path
}
