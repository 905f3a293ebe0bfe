//! 応答の適用順序
//!
//! ポーリング・アップロードの各リクエストに単調増加のチケットを振り、
//! 応答を状態へ反映してよいかを判定する。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 重なったリクエストの応答をどう扱うか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseOrdering {
    /// 最後に届いた応答が勝つ（発行順は見ない）
    #[default]
    LastResolved,
    /// 後から発行されたリクエストが反映済みなら古い応答は捨てる
    LatestIssued,
}

impl FromStr for ResponseOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last-resolved" | "last" => Ok(ResponseOrdering::LastResolved),
            "latest-issued" | "latest" => Ok(ResponseOrdering::LatestIssued),
            _ => Err(format!(
                "Unknown ordering: {}. Use last-resolved or latest-issued",
                s
            )),
        }
    }
}

impl fmt::Display for ResponseOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseOrdering::LastResolved => write!(f, "last-resolved"),
            ResponseOrdering::LatestIssued => write!(f, "latest-issued"),
        }
    }
}

/// リクエストごとのシーケンス番号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 古い応答とみなす基準
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supersede {
    /// より新しいチケットの応答が反映済みなら古い（ポーリング用）
    ByApplied,
    /// より新しいチケットが発行済みなら古い（アップロード用）
    ByIssued,
}

/// 1チャネル分の発行・反映の記録
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceTracker {
    issued: u64,
    applied: u64,
}

impl SequenceTracker {
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn latest_issued(&self) -> Option<Ticket> {
        (self.issued > 0).then_some(Ticket(self.issued))
    }

    pub fn latest_applied(&self) -> Option<Ticket> {
        (self.applied > 0).then_some(Ticket(self.applied))
    }

    /// 新しいチケットの応答がすでに反映済みか（記録は変えない）
    ///
    /// `LastResolved` では常にfalse。
    pub fn is_superseded(&self, ticket: Ticket, ordering: ResponseOrdering) -> bool {
        ordering == ResponseOrdering::LatestIssued && ticket.0 <= self.applied
    }

    /// 応答を反映してよいか判定し、よければ反映済みとして記録する
    pub fn accept(&mut self, ticket: Ticket, ordering: ResponseOrdering, rule: Supersede) -> bool {
        let fresh = match (ordering, rule) {
            (ResponseOrdering::LastResolved, _) => true,
            (ResponseOrdering::LatestIssued, Supersede::ByApplied) => ticket.0 > self.applied,
            (ResponseOrdering::LatestIssued, Supersede::ByIssued) => ticket.0 == self.issued,
        };
        if fresh {
            self.applied = self.applied.max(ticket.0);
        }
        fresh
    }
}
