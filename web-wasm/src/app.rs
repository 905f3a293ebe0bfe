//! メインアプリケーションコンポーネント
//!
//! 3つの処理が1つの `DashboardState` を共有する:
//! - ポーリング: 2秒ごとに `GET /detections`
//! - 映像ストリーム: `<img src="/video?...">`
//! - アップロード: ファイル選択 → プレビュー → `POST /upload/`

use leptos::prelude::*;
use live_detect_common::{
    DashboardState, Endpoints, DEFAULT_STREAM_HEIGHT, DEFAULT_STREAM_WIDTH, POLL_INTERVAL,
};
use web_sys::File;

use crate::api::backend;
use crate::components::{
    detection_list::DetectionList,
    header::Header,
    stream_viewer::StreamViewer,
    upload_panel::UploadPanel,
};
use crate::preview;

/// プレビューはオブジェクトURL
pub type WebDashboardState = DashboardState<String>;

#[component]
pub fn App() -> impl IntoView {
    let endpoints = Endpoints::default();
    let (state, set_state) = signal(WebDashboardState::default());

    // ポーリング（画面の寿命に合わせて開始・停止）
    let poll_endpoints = endpoints.clone();
    let poll = move || {
        let endpoints = poll_endpoints.clone();
        let ticket = set_state.try_update(|s| s.issue_poll());
        let Some(ticket) = ticket else { return };

        // 前回の応答を待たずに次を出す
        wasm_bindgen_futures::spawn_local(async move {
            match backend::fetch_detections(&endpoints).await {
                Ok(labels) => {
                    set_state.try_update(|s| s.apply_poll_success(ticket, labels));
                }
                Err(e) => {
                    gloo::console::error!("Failed to fetch detections", e);
                    set_state.try_update(|s| s.apply_poll_failure(ticket));
                }
            }
        });
    };
    let interval = match set_interval_with_handle(poll, POLL_INTERVAL) {
        Ok(handle) => Some(handle),
        Err(e) => {
            gloo::console::error!("Failed to start polling", e);
            None
        }
    };

    on_cleanup(move || {
        if let Some(handle) = interval {
            handle.clear();
        }
        if let Some(Some(url)) = set_state.try_update(|s| s.teardown()) {
            preview::release(&url);
        }
    });

    // 映像ストリーム
    let on_stream_load = move || {
        set_state.update(|s| {
            s.stream_loaded();
        });
    };
    let on_stream_error = move || {
        if let Some(alert) = set_state.try_update(|s| s.stream_error()) {
            gloo::dialogs::alert(alert.message);
        }
    };

    // アップロード
    let upload_endpoints = endpoints.clone();
    let on_file_selected = move |file: File| {
        let url = match preview::create(&file) {
            Ok(url) => url,
            Err(e) => {
                gloo::console::error!("Failed to create preview", e);
                return;
            }
        };
        let Some(start) = set_state.try_update(|s| s.begin_upload(url)) else { return };
        if let Some(released) = start.released {
            preview::release(&released);
        }

        let endpoints = upload_endpoints.clone();
        let ticket = start.ticket;
        wasm_bindgen_futures::spawn_local(async move {
            match backend::upload_image(&endpoints, &file).await {
                Ok(labels) => {
                    set_state.try_update(|s| s.apply_upload_success(ticket, labels));
                }
                Err(e) => {
                    gloo::console::error!("Upload failed", e);
                    set_state.try_update(|s| s.apply_upload_failure(ticket));
                }
            }
        });
    };

    let detections = Signal::derive(move || state.with(|s| s.detections().to_vec()));
    let stream_loaded = Signal::derive(move || state.with(|s| s.is_stream_loaded()));
    let upload_preview = Signal::derive(move || state.with(|s| s.preview().cloned()));
    let upload_results = Signal::derive(move || state.with(|s| s.upload_results().to_vec()));

    view! {
        <div class="container">
            <Header />

            <StreamViewer
                src=endpoints.video(DEFAULT_STREAM_WIDTH, DEFAULT_STREAM_HEIGHT).to_string()
                loaded=stream_loaded
                on_load=on_stream_load
                on_error=on_stream_error
            />

            <DetectionList detections=detections />

            <UploadPanel
                preview=upload_preview
                results=upload_results
                on_file_selected=on_file_selected
            />
        </div>
    }
}
