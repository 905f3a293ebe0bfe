//! 累積検出一覧コンポーネント

use leptos::prelude::*;

#[component]
pub fn DetectionList(detections: Signal<Vec<String>>) -> impl IntoView {
    view! {
        <section class="card">
            <h3>"Detected Objects (All time)"</h3>
            <Show
                when=move || !detections.with(|d| d.is_empty())
                fallback=|| view! { <p class="text-muted">"No objects detected yet."</p> }
            >
                <LabelList labels=detections />
            </Show>
        </section>
    }
}

/// ラベルの箇条書き（同じラベルが並んでもよいよう位置をキーにする）
#[component]
pub fn LabelList(labels: Signal<Vec<String>>) -> impl IntoView {
    view! {
        <ul class="label-list">
            <For
                each=move || labels.get().into_iter().enumerate()
                key=|(i, label)| (*i, label.clone())
                children=move |(_, label)| view! { <li>{label}</li> }
            />
        </ul>
    }
}
