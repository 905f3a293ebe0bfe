//! バックエンドHTTPクライアント
//!
//! - `GET /detections`: 累積検出ラベル
//! - `POST /upload/`: 画像1枚の検出
//! - `GET /video`: MJPEG映像ストリーム
//! - `GET /`: 案内メッセージ（疎通確認）

use crate::config::Config;
use crate::error::{LiveDetectError, Result};
use live_detect_common::{DetectionsResponse, Endpoints, ErrorBody, IndexResponse, UploadResponse};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::path::Path;
use std::time::Duration;

/// アップロード時のフォームフィールド名
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        // 映像ストリームは終わらないので全体タイムアウトは付けない
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoints,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoints()?, config.timeout())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// 現在の検出ラベル一覧を取得
    pub async fn fetch_detections(&self) -> Result<Vec<String>> {
        let url = self.endpoints.detections();
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).timeout(self.timeout).send().await?;
        let body = check_status(response).await?.text().await?;
        let parsed: DetectionsResponse = serde_json::from_str(&body)?;
        Ok(parsed.detected_objects)
    }

    /// ローカルファイルをアップロードして検出ラベルを受け取る
    pub async fn upload_file(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LiveDetectError::FileNotFound(path.display().to_string()),
            _ => LiveDetectError::Io(e),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        self.upload_bytes(&file_name, guess_mime_type(path), bytes).await
    }

    pub async fn upload_bytes(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<String>> {
        let url = self.endpoints.upload();
        tracing::debug!("POST {} ({}, {} bytes)", url, file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        let parsed: UploadResponse = serde_json::from_str(&body)?;
        Ok(parsed.detected)
    }

    /// 映像ストリームを開く（本文は呼び出し側で読み進める）
    pub async fn open_stream(&self, width: u32, height: u32) -> Result<Response> {
        let url = self.endpoints.video(width, height);
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        check_status(response).await
    }

    /// `GET /` の案内メッセージ
    pub async fn index(&self) -> Result<String> {
        let response = self
            .http
            .get(self.endpoints.index())
            .timeout(self.timeout)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        let parsed: IndexResponse = serde_json::from_str(&body)?;
        Ok(parsed.message)
    }
}

/// 非2xxを `Status` エラーに変換する
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LiveDetectError::Status {
        status: status.as_u16(),
        message: ErrorBody::message_from(&body),
    })
}

/// 拡張子からContent-Typeを推定（不明ならoctet-stream）
pub fn guess_mime_type(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}
