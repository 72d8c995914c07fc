//! 月別集計
//!
//! 炉1基分の記録を集計月ごとにまとめ、各計測項目の平均値と
//! 安全評価を求める。集計月の絞り込みには依存しない（トレンド表示用）。

use crate::fields::LeakChannel;
use crate::filter::distinct_periods;
use crate::period::{order_periods, PeriodOrder};
use crate::readings::{GasReadings, Inspection, LeakReadings, ThermalReadings};
use crate::resolver::KeyResolver;
use crate::types::{RawRecord, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 安全評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyRating {
    Perfect,
    Good,
    Warning,
}

impl SafetyRating {
    /// 正常率（%）から評価（境界値は下位に落ちる）
    pub fn from_percent(percent: u32) -> Self {
        if percent > 90 {
            SafetyRating::Perfect
        } else if percent > 70 {
            SafetyRating::Good
        } else {
            SafetyRating::Warning
        }
    }
}

impl fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyRating::Perfect => write!(f, "Perfect"),
            SafetyRating::Good => write!(f, "Good"),
            SafetyRating::Warning => write!(f, "Warning"),
        }
    }
}

/// 1集計月 × 1炉 の集計結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    /// 集計月ラベル
    pub period: String,
    /// 炉の名前
    pub unit: String,
    /// 集計に使った記録数
    pub record_count: usize,
    /// 温度平均
    pub thermal: ThermalReadings<f64>,
    /// ガス組成平均
    pub gas: GasReadings<f64>,
    /// ガス漏れ平均（ppm）
    pub leak: LeakReadings<f64>,
    /// メインガスラインが正常だった記録の割合（%、整数に丸め）
    pub normal_percent: u32,
    /// 安全評価
    pub safety_rating: SafetyRating,
}

/// 小数点以下1桁に丸める
///
/// 2進数の値そのもの（10進展開）を丸める。1.15 は 1.1499… なので 1.1。
/// ちょうど中間の値（x.25、x.75）は0から遠い側に丸める。
pub fn round1(value: f64) -> f64 {
    if (value * 4.0).fract() == 0.0 && (value * 2.0).fract() != 0.0 {
        return (value * 10.0).round() / 10.0;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// 数値サンプルの平均（小数点以下1桁）
///
/// `None` は合計にも件数にも含めない。サンプルがなければ0。
pub fn average<I>(samples: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = samples
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

/// 正常率（%）を整数に丸める
pub fn normal_percent(normal: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (normal as f64 / total as f64 * 100.0).round() as u32
}

/// 記録群から1件の集計を作る
pub fn summarize(period: &str, unit: &str, inspections: &[Inspection]) -> MonthlyAggregate {
    let thermal = ThermalReadings::from_fn(|instrument, pos| {
        average(inspections.iter().map(|i| *i.thermal.get(instrument, pos)))
    });
    let gas = GasReadings::from_fn(|zone, metric, op| {
        average(inspections.iter().map(|i| *i.gas.get(zone, metric, op)))
    });
    let leak = LeakReadings::from_fn(|channel| {
        average(inspections.iter().map(|i| *i.leak_ppm.get(channel)))
    });

    let normal = inspections
        .iter()
        .filter(|i| i.is_leak_normal(LeakChannel::Main))
        .count();
    let percent = normal_percent(normal, inspections.len());

    MonthlyAggregate {
        period: period.to_string(),
        unit: unit.to_string(),
        record_count: inspections.len(),
        thermal,
        gas,
        leak,
        normal_percent: percent,
        safety_rating: SafetyRating::from_percent(percent),
    }
}

/// 集計月ごとの集計（炉1基分）
///
/// # Arguments
/// * `records` - 全記録（集計月の絞り込み前）
/// * `unit` - 対象の炉。`Selection::All` の場合は空を返す
/// * `resolver` - ヘッダ表記の解決器
/// * `order` - 集計月の並び順
///
/// # Returns
/// 記録が1件以上ある集計月のみ。既定では記録に現れた順。
pub fn aggregate_by_period(
    records: &[RawRecord],
    unit: &Selection,
    resolver: &KeyResolver,
    order: PeriodOrder,
) -> Vec<MonthlyAggregate> {
    let unit = match unit.as_only() {
        Some(unit) => unit.trim(),
        None => {
            log::warn!("炉が未確定のため集計をスキップ");
            return Vec::new();
        }
    };

    let inspections: Vec<Inspection> = records
        .iter()
        .map(|r| Inspection::from_record(r, resolver))
        .filter(|i| i.unit == unit)
        .collect();

    let periods = order_periods(distinct_periods(records, resolver), order);

    periods
        .iter()
        .filter_map(|period| {
            let matched: Vec<Inspection> = inspections
                .iter()
                .filter(|i| &i.period == period)
                .cloned()
                .collect();
            if matched.is_empty() {
                return None;
            }
            log::debug!("集計: {} / {} ({}件)", unit, period, matched.len());
            Some(summarize(period, unit, &matched))
        })
        .collect()
}
