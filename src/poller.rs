//! 検出一覧の定期ポーリング
//!
//! ダッシュボードの寿命に紐づくバックグラウンドタスク。
//! `PollerHandle` を落とすとタイマーが止まる（送信済みのリクエストは止めない）。

use crate::dashboard::Dashboard;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub(crate) fn spawn(dashboard: Dashboard, period: Duration) -> Self {
        let task = tokio::spawn(async move {
            // 最初の発火は1周期後
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                // 前回の応答を待たずに次を出す（重複排除しない）
                let dashboard = dashboard.clone();
                tokio::spawn(async move {
                    dashboard.poll_once().await;
                });
            }
        });
        Self { task }
    }

    /// タイマーを止める
    pub fn shutdown(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
