//! ダッシュボードの状態
//!
//! ポーリング・映像ストリーム・アップロードの3つの処理が共有する唯一の状態。
//! どの処理も名前付きの操作でのみ状態を変更する。
//!
//! プレビュー参照の型 `P` は表示面ごとに異なる
//! （ブラウザではオブジェクトURL、CLIではローカルファイル）。

use crate::ordering::{ResponseOrdering, SequenceTracker, Supersede, Ticket};

/// 映像ストリームのエラー時にユーザーへ出す文言
pub const STREAM_ALERT_MESSAGE: &str = "Failed to load video stream";

/// 応答を反映した結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// 表示内容が変わった
    Changed,
    /// 反映したが内容は同じ
    Unchanged,
    /// 古い応答として捨てた
    Discarded,
}

impl Applied {
    pub fn is_applied(self) -> bool {
        !matches!(self, Applied::Discarded)
    }
}

/// アップロード開始時の戻り値
#[derive(Debug)]
pub struct UploadStart<P> {
    pub ticket: Ticket,
    /// 置き換えられた前回のプレビュー（呼び出し側で解放する）
    pub released: Option<P>,
}

/// ストリームエラー1回分の通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamAlert {
    pub message: &'static str,
    /// これまでの通知回数（今回を含む）
    pub count: u32,
}

#[derive(Debug)]
pub struct DashboardState<P> {
    ordering: ResponseOrdering,

    detections: Vec<String>,
    poll_seq: SequenceTracker,
    poll_failures: u32,

    preview: Option<P>,
    upload_results: Vec<String>,
    upload_seq: SequenceTracker,
    pending_uploads: usize,

    stream_loaded: bool,
    stream_alerts: u32,
}

impl<P> Default for DashboardState<P> {
    fn default() -> Self {
        Self::new(ResponseOrdering::default())
    }
}

impl<P> DashboardState<P> {
    pub fn new(ordering: ResponseOrdering) -> Self {
        Self {
            ordering,
            detections: Vec::new(),
            poll_seq: SequenceTracker::default(),
            poll_failures: 0,
            preview: None,
            upload_results: Vec::new(),
            upload_seq: SequenceTracker::default(),
            pending_uploads: 0,
            stream_loaded: false,
            stream_alerts: 0,
        }
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    // ---- ポーリング ----

    /// ポーリング1回分のチケットを発行
    pub fn issue_poll(&mut self) -> Ticket {
        self.poll_seq.issue()
    }

    /// 検出一覧をまるごと置き換える（差分マージはしない）
    pub fn apply_poll_success(&mut self, ticket: Ticket, labels: Vec<String>) -> Applied {
        if !self.poll_seq.accept(ticket, self.ordering, Supersede::ByApplied) {
            return Applied::Discarded;
        }
        self.poll_failures = 0;
        if self.detections == labels {
            return Applied::Unchanged;
        }
        self.detections = labels;
        Applied::Changed
    }

    /// 失敗したポーリング。一覧は直前の値のまま
    ///
    /// 連続失敗回数を返す。新しい応答が反映済みの古い失敗は数えずNone。
    pub fn apply_poll_failure(&mut self, ticket: Ticket) -> Option<u32> {
        if self.poll_seq.is_superseded(ticket, self.ordering) {
            return None;
        }
        self.poll_failures = self.poll_failures.saturating_add(1);
        Some(self.poll_failures)
    }

    pub fn detections(&self) -> &[String] {
        &self.detections
    }

    /// 連続したポーリング失敗の回数
    pub fn poll_failures(&self) -> u32 {
        self.poll_failures
    }

    // ---- アップロード ----

    /// ファイル選択直後の処理
    ///
    /// プレビューを差し替え、結果を空にしてからチケットを発行する。
    /// 前回のプレビューは `released` として返す。
    pub fn begin_upload(&mut self, preview: P) -> UploadStart<P> {
        let released = self.preview.replace(preview);
        self.upload_results.clear();
        self.pending_uploads += 1;
        UploadStart {
            ticket: self.upload_seq.issue(),
            released,
        }
    }

    pub fn apply_upload_success(&mut self, ticket: Ticket, labels: Vec<String>) -> Applied {
        self.pending_uploads = self.pending_uploads.saturating_sub(1);
        if !self.upload_seq.accept(ticket, self.ordering, Supersede::ByIssued) {
            return Applied::Discarded;
        }
        if self.upload_results == labels {
            return Applied::Unchanged;
        }
        self.upload_results = labels;
        Applied::Changed
    }

    /// 失敗したアップロード。結果は触らない
    pub fn apply_upload_failure(&mut self, _ticket: Ticket) {
        self.pending_uploads = self.pending_uploads.saturating_sub(1);
    }

    pub fn preview(&self) -> Option<&P> {
        self.preview.as_ref()
    }

    pub fn upload_results(&self) -> &[String] {
        &self.upload_results
    }

    pub fn pending_uploads(&self) -> usize {
        self.pending_uploads
    }

    // ---- 映像ストリーム ----

    /// 読み込み完了。初回だけ `true` を返す
    pub fn stream_loaded(&mut self) -> bool {
        !std::mem::replace(&mut self.stream_loaded, true)
    }

    /// 読み込みエラー。1回ごとに通知を1つ返す
    pub fn stream_error(&mut self) -> StreamAlert {
        self.stream_alerts = self.stream_alerts.saturating_add(1);
        StreamAlert {
            message: STREAM_ALERT_MESSAGE,
            count: self.stream_alerts,
        }
    }

    pub fn is_stream_loaded(&self) -> bool {
        self.stream_loaded
    }

    pub fn stream_alerts(&self) -> u32 {
        self.stream_alerts
    }

    // ---- 終了 ----

    /// 表示終了時に現在のプレビューを手放す
    pub fn teardown(&mut self) -> Option<P> {
        self.preview.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_poll_replaces_list_in_order() {
        let mut state = DashboardState::<String>::default();
        let t = state.issue_poll();
        assert_eq!(state.apply_poll_success(t, labels(&["person", "cup"])), Applied::Changed);
        assert_eq!(state.detections(), ["person", "cup"]);

        let t = state.issue_poll();
        assert_eq!(state.apply_poll_success(t, labels(&["cup"])), Applied::Changed);
        assert_eq!(state.detections(), ["cup"]);
    }

    #[test]
    fn test_poll_failure_keeps_previous_list() {
        let mut state = DashboardState::<String>::default();
        let t = state.issue_poll();
        state.apply_poll_success(t, labels(&["dog"]));

        let t = state.issue_poll();
        assert_eq!(state.apply_poll_failure(t), Some(1));
        assert_eq!(state.detections(), ["dog"]);

        let t = state.issue_poll();
        assert_eq!(state.apply_poll_success(t, labels(&["dog"])), Applied::Unchanged);
        assert_eq!(state.poll_failures(), 0);
    }

    #[test]
    fn test_stale_poll_failure_not_counted() {
        let mut state = DashboardState::<String>::new(ResponseOrdering::LatestIssued);
        let older = state.issue_poll();
        let newer = state.issue_poll();
        state.apply_poll_success(newer, labels(&["cup"]));

        assert_eq!(state.apply_poll_failure(older), None);
        assert_eq!(state.poll_failures(), 0);
        assert_eq!(state.detections(), ["cup"]);

        // LastResolved では古い失敗も数える
        let mut state = DashboardState::<String>::new(ResponseOrdering::LastResolved);
        let older = state.issue_poll();
        let newer = state.issue_poll();
        state.apply_poll_success(newer, labels(&["cup"]));
        assert_eq!(state.apply_poll_failure(older), Some(1));
    }

    #[test]
    fn test_poll_last_resolved_wins() {
        let mut state = DashboardState::<String>::new(ResponseOrdering::LastResolved);
        let older = state.issue_poll();
        let newer = state.issue_poll();
        state.apply_poll_success(newer, labels(&["new"]));
        state.apply_poll_success(older, labels(&["old"]));
        assert_eq!(state.detections(), ["old"]);
    }

    #[test]
    fn test_poll_latest_issued_discards_stale() {
        let mut state = DashboardState::<String>::new(ResponseOrdering::LatestIssued);
        let older = state.issue_poll();
        let newer = state.issue_poll();
        state.apply_poll_success(newer, labels(&["new"]));
        assert_eq!(state.apply_poll_success(older, labels(&["old"])), Applied::Discarded);
        assert_eq!(state.detections(), ["new"]);
    }

    #[test]
    fn test_begin_upload_clears_results_and_sets_preview() {
        let mut state = DashboardState::<String>::default();
        let first = state.begin_upload("blob:1".to_string());
        assert!(first.released.is_none());
        state.apply_upload_success(first.ticket, labels(&["cat"]));
        assert_eq!(state.upload_results(), ["cat"]);

        let second = state.begin_upload("blob:2".to_string());
        assert_eq!(second.released.as_deref(), Some("blob:1"));
        assert!(state.upload_results().is_empty());
        assert_eq!(state.preview().map(String::as_str), Some("blob:2"));
    }

    #[test]
    fn test_upload_failure_leaves_results_empty() {
        let mut state = DashboardState::<String>::default();
        let start = state.begin_upload("blob:1".to_string());
        assert_eq!(state.pending_uploads(), 1);
        state.apply_upload_failure(start.ticket);
        assert!(state.upload_results().is_empty());
        assert_eq!(state.pending_uploads(), 0);
    }

    #[test]
    fn test_overlapping_uploads_last_resolved() {
        let mut state = DashboardState::<String>::new(ResponseOrdering::LastResolved);
        let a = state.begin_upload("blob:a".to_string());
        let b = state.begin_upload("blob:b".to_string());
        state.apply_upload_success(b.ticket, labels(&["b"]));
        state.apply_upload_success(a.ticket, labels(&["a"]));
        assert_eq!(state.upload_results(), ["a"]);
    }

    #[test]
    fn test_overlapping_uploads_latest_issued() {
        let mut state = DashboardState::<String>::new(ResponseOrdering::LatestIssued);
        let a = state.begin_upload("blob:a".to_string());
        let b = state.begin_upload("blob:b".to_string());
        assert_eq!(state.apply_upload_success(a.ticket, labels(&["a"])), Applied::Discarded);
        assert!(state.upload_results().is_empty());
        state.apply_upload_success(b.ticket, labels(&["b"]));
        assert_eq!(state.upload_results(), ["b"]);
        assert_eq!(state.pending_uploads(), 0);
    }

    #[test]
    fn test_stream_loaded_once() {
        let mut state = DashboardState::<String>::default();
        assert!(!state.is_stream_loaded());
        assert!(state.stream_loaded());
        assert!(!state.stream_loaded());
        state.stream_error();
        assert!(state.is_stream_loaded());
    }

    #[test]
    fn test_one_alert_per_stream_error() {
        let mut state = DashboardState::<String>::default();
        let first = state.stream_error();
        let second = state.stream_error();
        assert_eq!(first.message, STREAM_ALERT_MESSAGE);
        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert_eq!(state.stream_alerts(), 2);
    }

    #[test]
    fn test_teardown_releases_preview() {
        let mut state = DashboardState::<String>::default();
        state.begin_upload("blob:1".to_string());
        assert_eq!(state.teardown().as_deref(), Some("blob:1"));
        assert!(state.teardown().is_none());
    }
}
