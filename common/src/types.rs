//! バックエンドAPIのペイロード型
//!
//! CLIとWeb(WASM)で共有される型:
//! - DetectionsResponse: `GET /detections` の応答
//! - UploadResponse: `POST /upload/` の応答
//! - ErrorBody: 非2xx応答の本文
//! - IndexResponse: `GET /` の応答

use serde::{Deserialize, Serialize};

/// 検出ラベル一覧（累積）
///
/// `detected_objects` は必須。欠けている応答はパース失敗として扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionsResponse {
    pub detected_objects: Vec<String>,
}

/// アップロード画像の検出結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// 欠けている場合は空
    #[serde(default)]
    pub detected: Vec<String>,
}

/// バックエンドのエラー応答（例: `{"error": "Invalid image"}`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// 応答本文からエラーメッセージを取り出す
    ///
    /// JSONでなければ本文をそのまま返す
    pub fn message_from(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string())
    }
}

/// `GET /` の案内メッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub message: String,
}
