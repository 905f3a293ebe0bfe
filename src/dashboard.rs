//! 検出ダッシュボード（CLI版）
//!
//! ポーリング・映像ストリーム・アップロードの3処理を独立したタスクで動かし、
//! 共有するのは `DashboardState` だけ。状態の変更は短いクリティカルセクションで行い、
//! ロックを保持したまま `.await` しない。
//!
//! 表示は `DashboardEvent` をチャネルで受け取った側が行う。

use crate::client::BackendClient;
use crate::poller::PollerHandle;
use crate::stream::{frame_dimensions, StreamOptions, StreamViewer};
use live_detect_common::{Applied, DashboardState, ResponseOrdering, Ticket};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// 選択されたローカルファイルへの参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPreview {
    pub path: PathBuf,
    /// 選択時点のサイズ（取得できなければNone）
    pub size: Option<u64>,
}

impl LocalPreview {
    pub fn from_path(path: PathBuf) -> Self {
        let size = std::fs::metadata(&path).ok().map(|m| m.len());
        Self { path, size }
    }
}

/// 表示側へ通知する出来事
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    DetectionsChanged(Vec<String>),
    PollFailed { error: String, consecutive: u32 },
    UploadStarted { ticket: Ticket, preview: LocalPreview },
    UploadCompleted { ticket: Ticket, labels: Vec<String> },
    UploadDiscarded { ticket: Ticket },
    UploadFailed { ticket: Ticket, error: String },
    StreamLoaded { dimensions: Option<(u32, u32)> },
    StreamAlert { message: String, count: u32 },
}

pub type SharedState = Arc<Mutex<DashboardState<LocalPreview>>>;

#[derive(Clone)]
pub struct Dashboard {
    client: BackendClient,
    state: SharedState,
    events: UnboundedSender<DashboardEvent>,
}

impl Dashboard {
    pub fn new(
        client: BackendClient,
        ordering: ResponseOrdering,
    ) -> (Self, UnboundedReceiver<DashboardEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let dashboard = Self {
            client,
            state: Arc::new(Mutex::new(DashboardState::new(ordering))),
            events,
        };
        (dashboard, rx)
    }

    /// 状態を読む
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState<LocalPreview>) -> R) -> R {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn update<R>(&self, f: impl FnOnce(&mut DashboardState<LocalPreview>) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn emit(&self, event: DashboardEvent) {
        // 受信側が閉じていても処理は続ける
        let _ = self.events.send(event);
    }

    // ---- ポーリング ----

    /// ポーリング1回分
    ///
    /// 失敗はログに残すだけで、一覧は直前の値のまま。
    pub async fn poll_once(&self) {
        let ticket = self.update(|s| s.issue_poll());

        match self.client.fetch_detections().await {
            Ok(labels) => {
                let applied = self.update(|s| s.apply_poll_success(ticket, labels.clone()));
                match applied {
                    Applied::Changed => self.emit(DashboardEvent::DetectionsChanged(labels)),
                    Applied::Unchanged => {}
                    Applied::Discarded => tracing::debug!("古いポーリング応答を破棄: {}", ticket),
                }
            }
            Err(e) => {
                tracing::error!("Failed to fetch detections: {}", e);
                match self.update(|s| s.apply_poll_failure(ticket)) {
                    Some(consecutive) => self.emit(DashboardEvent::PollFailed {
                        error: e.to_string(),
                        consecutive,
                    }),
                    None => tracing::debug!("新しい一覧が反映済みのため失敗を数えない: {}", ticket),
                }
            }
        }
    }

    /// 一定間隔のポーリングを開始（ハンドルを落とすと止まる）
    pub fn start_polling(&self, period: Duration) -> PollerHandle {
        PollerHandle::spawn(self.clone(), period)
    }

    // ---- アップロード ----

    /// ファイル選択
    ///
    /// プレビュー設定と結果クリアを済ませてから送信タスクを起動する。
    /// ファイルがなければ何もしない。
    pub fn select_file(&self, path: Option<PathBuf>) -> Option<JoinHandle<()>> {
        let path = path?;
        let preview = LocalPreview::from_path(path.clone());

        let start = self.update(|s| s.begin_upload(preview.clone()));
        if let Some(released) = start.released {
            tracing::debug!("プレビューを解放: {}", released.path.display());
        }
        let ticket = start.ticket;
        self.emit(DashboardEvent::UploadStarted { ticket, preview });

        let dashboard = self.clone();
        Some(tokio::spawn(async move {
            dashboard.finish_upload(ticket, path).await;
        }))
    }

    async fn finish_upload(&self, ticket: Ticket, path: PathBuf) {
        match self.client.upload_file(&path).await {
            Ok(labels) => {
                let applied = self.update(|s| s.apply_upload_success(ticket, labels.clone()));
                if applied.is_applied() {
                    self.emit(DashboardEvent::UploadCompleted { ticket, labels });
                } else {
                    tracing::debug!("古いアップロード応答を破棄: {}", ticket);
                    self.emit(DashboardEvent::UploadDiscarded { ticket });
                }
            }
            Err(e) => {
                tracing::error!("Upload failed: {}", e);
                self.update(|s| s.apply_upload_failure(ticket));
                self.emit(DashboardEvent::UploadFailed {
                    ticket,
                    error: e.to_string(),
                });
            }
        }
    }

    // ---- 映像ストリーム ----

    /// 映像ストリームの受信を開始
    ///
    /// 最初のフレームで読み込み完了、失敗で通知を1回出す。再接続はしない。
    pub fn start_stream(&self, options: StreamOptions) -> JoinHandle<()> {
        let dashboard = self.clone();
        tokio::spawn(async move {
            let viewer = StreamViewer::new(dashboard.client.clone(), options);
            let result = viewer
                .run(|index, frame| {
                    if index == 0 && dashboard.update(|s| s.stream_loaded()) {
                        dashboard.emit(DashboardEvent::StreamLoaded {
                            dimensions: frame_dimensions(frame),
                        });
                    }
                })
                .await;

            if let Err(e) = result {
                tracing::error!("video stream error: {}", e);
                let alert = dashboard.update(|s| s.stream_error());
                dashboard.emit(DashboardEvent::StreamAlert {
                    message: alert.message.to_string(),
                    count: alert.count,
                });
            }
        })
    }

    // ---- 終了 ----

    /// 表示終了。現在のプレビューを手放す
    pub fn teardown(&self) -> Option<LocalPreview> {
        self.update(|s| s.teardown())
    }
}
