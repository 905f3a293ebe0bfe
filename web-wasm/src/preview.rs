//! アップロード画像のプレビュー（オブジェクトURL）
//!
//! 差し替え時・画面破棄時に `URL.revokeObjectURL` で解放する。

use wasm_bindgen::JsValue;
use web_sys::{File, Url};

pub fn create(file: &File) -> Result<String, JsValue> {
    Url::create_object_url_with_blob(file)
}

pub fn release(url: &str) {
    if let Err(e) = Url::revoke_object_url(url) {
        gloo::console::warn!("Failed to revoke preview URL", e);
    }
}
