//! 端末への表示

use crate::dashboard::DashboardEvent;

pub const TITLE: &str = "Live Object Detection";
pub const NO_DETECTIONS: &str = "No objects detected yet.";
pub const LOADING_STREAM: &str = "Loading video stream...";

/// 検出ラベル一覧（空なら案内文）
pub fn format_detections(header: &str, labels: &[String]) -> String {
    if labels.is_empty() {
        return format!("{}\n  {}", header, NO_DETECTIONS);
    }
    let items: Vec<String> = labels.iter().map(|l| format!("  • {}", l)).collect();
    format!("{}\n{}", header, items.join("\n"))
}

/// アップロード結果（空なら何も出さない）
pub fn format_upload_results(labels: &[String]) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    let items: Vec<String> = labels.iter().map(|l| format!("  • {}", l)).collect();
    Some(format!("Detected in Image:\n{}", items.join("\n")))
}

/// 1行分の表示内容。表示しない出来事はNone
pub fn format_event(event: &DashboardEvent) -> Option<String> {
    match event {
        DashboardEvent::DetectionsChanged(labels) => {
            Some(format_detections("Detected Objects (All time)", labels))
        }
        DashboardEvent::PollFailed { consecutive, .. } if *consecutive == 1 => {
            Some("⚠ 検出一覧の取得に失敗（前回の一覧を表示中）".to_string())
        }
        DashboardEvent::PollFailed { .. } => None,
        DashboardEvent::UploadStarted { ticket, preview } => {
            let size = preview
                .size
                .map(|s| format!(" ({} bytes)", s))
                .unwrap_or_default();
            Some(format!(
                "📤 {} アップロード中: {}{}",
                ticket,
                preview.path.display(),
                size
            ))
        }
        DashboardEvent::UploadCompleted { ticket, labels } => Some(
            format_upload_results(labels)
                .map(|s| format!("{} {}", ticket, s))
                .unwrap_or_else(|| format!("{} 画像から物体は検出されませんでした", ticket)),
        ),
        DashboardEvent::UploadDiscarded { .. } => None,
        DashboardEvent::UploadFailed { .. } => None,
        DashboardEvent::StreamLoaded { dimensions } => Some(match dimensions {
            Some((w, h)) => format!("🎥 映像ストリーム受信中 ({}x{})", w, h),
            None => "🎥 映像ストリーム受信中".to_string(),
        }),
        DashboardEvent::StreamAlert { message, .. } => Some(format!("❌ {}", message)),
    }
}

pub fn print_event(event: &DashboardEvent) {
    if let Some(text) = format_event(event) {
        let now = chrono::Local::now().format("%H:%M:%S");
        println!("[{}] {}", now, text);
    }
}
