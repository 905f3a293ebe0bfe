//! 検出バックエンドとの通信（fetch）
//!
//! - `GET /detections`: 累積検出ラベル
//! - `POST /upload/`: 画像1枚の検出（multipart、フィールド名 `file`）
//!
//! ネットワークエラーと非2xxは区別せずに `Err` を返す。

use live_detect_common::{DetectionsResponse, Endpoints, ErrorBody, UploadResponse};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, RequestMode, Response};

/// アップロード時のフォームフィールド名
pub const UPLOAD_FIELD: &str = "file";

/// fetchしてJSON本文を返す（共通処理）
async fn fetch_json(request: &Request) -> Result<JsValue, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    if !resp.ok() {
        let body = JsFuture::from(resp.text()?).await?.as_string().unwrap_or_default();
        return Err(JsValue::from_str(&format!(
            "HTTP {}: {}",
            resp.status(),
            ErrorBody::message_from(&body)
        )));
    }

    JsFuture::from(resp.json()?).await
}

/// 現在の検出ラベル一覧を取得
pub async fn fetch_detections(endpoints: &Endpoints) -> Result<Vec<String>, JsValue> {
    let mut opts = RequestInit::new();
    opts.method("GET");
    opts.mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(endpoints.detections().as_str(), &opts)?;
    let json = fetch_json(&request).await?;
    let response: DetectionsResponse = serde_wasm_bindgen::from_value(json)?;
    Ok(response.detected_objects)
}

/// 画像をアップロードして検出ラベルを受け取る
///
/// # Returns
/// `detected` が無い応答は空のVec
pub async fn upload_image(endpoints: &Endpoints, file: &File) -> Result<Vec<String>, JsValue> {
    let form = FormData::new()?;
    form.append_with_blob_and_filename(UPLOAD_FIELD, file, &file.name())?;

    let mut opts = RequestInit::new();
    opts.method("POST");
    opts.mode(RequestMode::Cors);
    opts.body(Some(form.as_ref()));

    let request = Request::new_with_str_and_init(endpoints.upload().as_str(), &opts)?;
    let json = fetch_json(&request).await?;
    let response: UploadResponse = serde_wasm_bindgen::from_value(json)?;
    Ok(response.detected)
}
