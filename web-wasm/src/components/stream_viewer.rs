//! 映像ストリームコンポーネント
//!
//! `<img>` は読み込み状態に関係なく常に描画する。
//! `loaded` は「読み込み中」表示の切り替えにだけ使う。

use leptos::prelude::*;

#[component]
pub fn StreamViewer<FL, FE>(
    src: String,
    loaded: Signal<bool>,
    on_load: FL,
    on_error: FE,
) -> impl IntoView
where
    FL: Fn() + 'static,
    FE: Fn() + 'static,
{
    view! {
        <Show when=move || !loaded.get()>
            <p class="stream-loading text-muted">"Loading video stream..."</p>
        </Show>

        <div class="stream-frame">
            <img
                src=src
                alt="Live Object Detection Stream"
                on:load=move |_| on_load()
                on:error=move |_| on_error()
            />
        </div>
    }
}
