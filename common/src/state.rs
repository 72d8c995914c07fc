//! ダッシュボードの状態
//!
//! 状態は不変のスナップショットとして扱い、`apply` で新しい状態を作る。
//! 表示データは `view` で毎回状態から導出する（キャッシュは持たない）。

use crate::aggregate::aggregate_by_period;
use crate::filter::{distinct_periods, distinct_units, effective_unit, filter_records};
use crate::period::PeriodOrder;
use crate::resolver::KeyResolver;
use crate::types::{FilterCriteria, RawRecord, Selection};
use crate::view::{assemble, DashboardView};
use serde::{Deserialize, Serialize};

/// 読み込み状態
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadStatus {
    /// 未読み込み
    #[default]
    NotLoaded,
    /// 読み込み済み
    Loaded { records: usize },
    /// 読み込めたが有効な記録がない
    EmptyDataset,
    /// データ元に到達できなかった（以前のデータは保持）
    FetchFailed { message: String },
    /// 取得できたが内容を読めなかった（以前のデータは保持）
    Unreadable { message: String },
}

impl LoadStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LoadStatus::FetchFailed { .. } | LoadStatus::Unreadable { .. }
        )
    }
}

/// 状態の更新操作
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// 読み込み成功（空なら EmptyDataset）
    Loaded(Vec<RawRecord>),
    /// 取得失敗
    LoadFailed(String),
    /// 内容の読み込み失敗
    ReadFailed(String),
    SelectUnit(Selection),
    SelectPeriod(Selection),
    SetPeriodOrder(PeriodOrder),
}

/// ダッシュボードの状態スナップショット
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    records: Vec<RawRecord>,
    /// 炉の選択（None = 未選択 → 既定の炉）
    unit: Option<Selection>,
    period: Selection,
    period_order: PeriodOrder,
    status: LoadStatus,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn period_order(&self) -> PeriodOrder {
        self.period_order
    }

    /// 操作を適用した新しい状態
    pub fn apply(&self, action: Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::Loaded(records) => {
                next.status = if records.is_empty() {
                    LoadStatus::EmptyDataset
                } else {
                    LoadStatus::Loaded {
                        records: records.len(),
                    }
                };
                next.records = records;
            }
            Action::LoadFailed(message) => {
                // 以前のデータはそのまま表示できるように残す
                next.status = LoadStatus::FetchFailed { message };
            }
            Action::ReadFailed(message) => next.status = LoadStatus::Unreadable { message },
            Action::SelectUnit(selection) => next.unit = Some(selection),
            Action::SelectPeriod(selection) => next.period = selection,
            Action::SetPeriodOrder(order) => next.period_order = order,
        }
        next
    }

    /// 絞り込み条件（炉が未選択なら既定の炉）
    pub fn criteria(&self, resolver: &KeyResolver) -> FilterCriteria {
        let unit = match &self.unit {
            Some(selection) => selection.clone(),
            None => match effective_unit(&self.records, &Selection::All, resolver) {
                Some(unit) => Selection::Only(unit),
                None => Selection::All,
            },
        };
        FilterCriteria::new(unit, self.period.clone())
    }

    /// 表示データを導出する
    pub fn view(&self, resolver: &KeyResolver) -> DashboardView {
        let criteria = self.criteria(resolver);
        let filtered = filter_records(&self.records, &criteria, resolver);

        // 集計は常に炉1基分（ワイルドカードなら既定の炉）
        let unit = effective_unit(&self.records, &criteria.unit, resolver);
        let trend = match &unit {
            Some(unit) => aggregate_by_period(
                &self.records,
                &Selection::only(unit.as_str()),
                resolver,
                self.period_order,
            ),
            None => Vec::new(),
        };

        let model = assemble(&filtered, trend, resolver);

        DashboardView {
            unit_options: distinct_units(&self.records, resolver),
            period_options: distinct_periods(&self.records, resolver),
            effective_unit: unit,
            latest: model.latest,
            snapshot: model.snapshot,
            trend: model.trend,
            status: self.status.clone(),
        }
    }
}
