//! バックエンドのエンドポイントURL

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// 既定のバックエンド（ローカル開発環境）
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// 検出一覧のポーリング間隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// 映像ストリームの既定サイズ
pub const DEFAULT_STREAM_WIDTH: u32 = 640;
pub const DEFAULT_STREAM_HEIGHT: u32 = 480;

/// バックエンドのエンドポイント一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// ベースURLから作成
    ///
    /// # Arguments
    /// * `base` - "http://localhost:8000" 形式のURL（末尾スラッシュは任意）
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base.trim())?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!("HTTP(S)のURLではありません: {}", base)));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /`
    pub fn index(&self) -> Url {
        self.base.clone()
    }

    /// `GET /detections`
    pub fn detections(&self) -> Url {
        self.with_segments(&["detections"])
    }

    /// `POST /upload/`（末尾スラッシュ必須）
    pub fn upload(&self) -> Url {
        self.with_segments(&["upload", ""])
    }

    /// `GET /video?width=W&height=H`
    pub fn video(&self, width: u32, height: u32) -> Url {
        let mut url = self.with_segments(&["video"]);
        url.query_pairs_mut()
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string());
        url
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot-be-a-base は new() で弾いている
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid http URL")
    }
}
