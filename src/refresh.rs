//! 再取得の制御
//!
//! 取得中に次の再取得が要求された場合は、取得元に触れずに
//! `Skipped` を返す（同時に1件のみ実行）。

use crate::error::KilnError;
use crate::source::DataSource;
use kiln_common::{Action, Ingested, RawRecord};
use std::sync::atomic::{AtomicBool, Ordering};

/// 再取得の結果
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// 1件以上の記録を取得
    Loaded(Vec<RawRecord>),
    /// 取得できたが有効な記録がない
    Empty,
    /// 取得失敗（取得元に到達できない）
    Failed(String),
    /// 取得できたが内容を読めない
    Unreadable(String),
    /// 取得中のため見送り
    Skipped,
}

impl RefreshOutcome {
    /// 状態更新の操作に変換（見送りは None）
    pub fn into_action(self) -> Option<Action> {
        match self {
            RefreshOutcome::Loaded(records) => Some(Action::Loaded(records)),
            RefreshOutcome::Empty => Some(Action::Loaded(Vec::new())),
            RefreshOutcome::Failed(message) => Some(Action::LoadFailed(message)),
            RefreshOutcome::Unreadable(message) => Some(Action::ReadFailed(message)),
            RefreshOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RefreshOutcome::Skipped)
    }
}

/// 取得中フラグの解放（どの経路で抜けても解放する）
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Refresher {
    source: DataSource,
    in_flight: AtomicBool,
}

impl Refresher {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: &self.in_flight,
            })
    }

    /// 再取得を1回実行
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_guard) = self.try_begin() else {
            log::warn!("取得中のため再取得を見送り");
            return RefreshOutcome::Skipped;
        };

        match self.source.load().await {
            Ok(Ingested::Records(records)) => RefreshOutcome::Loaded(records),
            Ok(Ingested::EmptyDataset) => RefreshOutcome::Empty,
            Err(e @ KilnError::FetchFailure(_)) => {
                log::warn!("取得失敗: {}", e);
                RefreshOutcome::Failed(e.to_string())
            }
            Err(e) => {
                log::warn!("読み込み失敗: {}", e);
                RefreshOutcome::Unreadable(e.to_string())
            }
        }
    }
}
