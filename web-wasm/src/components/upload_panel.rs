//! 画像アップロードコンポーネント

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, File, HtmlInputElement};
use crate::components::detection_list::LabelList;

#[component]
pub fn UploadPanel<F>(
    preview: Signal<Option<String>>,
    results: Signal<Vec<String>>,
    on_file_selected: F,
) -> impl IntoView
where
    F: Fn(File) + 'static,
{
    let on_change = move |ev: Event| {
        if let Some(file) = selected_file(&ev) {
            on_file_selected(file);
        }
    };

    view! {
        <section class="card">
            <h3>"Upload Image for Detection"</h3>
            <input type="file" accept="image/*" on:change=on_change />

            {move || preview.get().map(|url| view! {
                <div class="upload-preview">
                    <img src=url alt="Uploaded Preview" />
                </div>
            })}

            <Show when=move || !results.with(|r| r.is_empty())>
                <div class="upload-results">
                    <h4>"Detected in Image:"</h4>
                    <LabelList labels=results />
                </div>
            </Show>
        </section>
    }
}

/// changeイベントから最初のファイルを取り出す
fn selected_file(ev: &Event) -> Option<File> {
    ev.target()?
        .dyn_into::<HtmlInputElement>()
        .ok()?
        .files()?
        .get(0)
}
