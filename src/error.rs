use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiveDetectError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("バックエンドがエラーを返しました ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("映像ストリームが最初のフレームの前に切断されました")]
    StreamClosed,

    #[error(transparent)]
    Common(#[from] live_detect_common::Error),
}

pub type Result<T> = std::result::Result<T, LiveDetectError>;
