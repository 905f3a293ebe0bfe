use crate::error::{LiveDetectError, Result};
use live_detect_common::{
    Endpoints, ResponseOrdering, DEFAULT_BASE_URL, DEFAULT_STREAM_HEIGHT, DEFAULT_STREAM_WIDTH,
    POLL_INTERVAL,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// ベースURLを上書きする環境変数
pub const BASE_URL_ENV: &str = "LIVE_DETECT_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub stream_width: u32,
    pub stream_height: u32,
    /// JSON APIの応答待ち時間（映像ストリームには適用しない）
    pub timeout_seconds: u64,
    pub ordering: ResponseOrdering,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
            stream_width: DEFAULT_STREAM_WIDTH,
            stream_height: DEFAULT_STREAM_HEIGHT,
            timeout_seconds: 30,
            ordering: ResponseOrdering::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LiveDetectError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("live-detect").join("config.json"))
    }

    /// コマンドライン > 環境変数 > 設定ファイル の順でベースURLを決める
    pub fn with_overrides(&self, cli_base_url: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(url) = cli_base_url {
            config.base_url = url.to_string();
        } else if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        Endpoints::new(&url)?;
        self.base_url = url;
        self.save()
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        Ok(Endpoints::new(&self.base_url)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}
