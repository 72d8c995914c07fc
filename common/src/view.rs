//! 表示用データの組み立て
//!
//! 絞り込み済みの記録と月別集計を、画面（CLI表示・エクスポート）が
//! そのまま使える形にまとめる。計算はしない。

use crate::aggregate::MonthlyAggregate;
use crate::fields::{FiringZone, GasMetric, GridPosition, Instrument, LeakChannel, OperatingPoint};
use crate::readings::{Grid, Inspection};
use crate::resolver::KeyResolver;
use crate::state::LoadStatus;
use crate::types::RawRecord;
use serde::{Deserialize, Serialize};

/// 温度グリッドの1マス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub position: GridPosition,
    pub label: String,
    pub value: Option<f64>,
}

/// ガス組成の1行（OP別、ゾーン1・2）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasRow {
    pub operating_point: u8,
    pub zone1: Option<f64>,
    pub zone2: Option<f64>,
}

/// ガス漏れセンサーの表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakCard {
    pub channel: LeakChannel,
    pub label: String,
    pub ppm: Option<f64>,
    pub status: Option<String>,
    pub is_normal: bool,
}

/// 最新記録の現況表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView {
    pub timestamp: String,
    pub unit: String,
    pub period: String,
    pub inspector: Option<String>,
    pub cone_grid: Vec<Vec<GridCell>>,
    pub ring_grid: Vec<Vec<GridCell>>,
    pub o2: Vec<GasRow>,
    pub co2: Vec<GasRow>,
    pub co: Vec<GasRow>,
    pub leaks: Vec<LeakCard>,
}

fn grid_cells(grid: &Grid<Option<f64>>) -> Vec<Vec<GridCell>> {
    let mut rows: Vec<Vec<GridCell>> = vec![Vec::new(), Vec::new(), Vec::new()];
    for pos in GridPosition::ALL {
        let (row, _) = pos.row_col();
        rows[row].push(GridCell {
            position: pos,
            label: pos.label().to_string(),
            value: *grid.get(pos),
        });
    }
    rows
}

fn gas_rows(inspection: &Inspection, metric: GasMetric) -> Vec<GasRow> {
    OperatingPoint::ALL
        .into_iter()
        .map(|op| GasRow {
            operating_point: op.percent(),
            zone1: *inspection.gas.get(FiringZone::Zone1, metric, op),
            zone2: *inspection.gas.get(FiringZone::Zone2, metric, op),
        })
        .collect()
}

impl SnapshotView {
    /// 最新記録から現況表示を作る（タイムスタンプがなければNone）
    pub fn from_record(record: &RawRecord, resolver: &KeyResolver) -> Option<Self> {
        let inspection = Inspection::from_record(record, resolver);
        if inspection.timestamp.is_empty() {
            return None;
        }

        let leaks = LeakChannel::ALL
            .into_iter()
            .map(|channel| LeakCard {
                channel,
                label: channel.display_name().to_string(),
                ppm: *inspection.leak_ppm.get(channel),
                status: inspection.leak_status.get(channel).clone(),
                is_normal: inspection.is_leak_normal(channel),
            })
            .collect();

        Some(Self {
            cone_grid: grid_cells(inspection.thermal.grid(Instrument::Cone)),
            ring_grid: grid_cells(inspection.thermal.grid(Instrument::Ring)),
            o2: gas_rows(&inspection, GasMetric::O2),
            co2: gas_rows(&inspection, GasMetric::Co2),
            co: gas_rows(&inspection, GasMetric::Co),
            leaks,
            timestamp: inspection.timestamp,
            unit: inspection.unit,
            period: inspection.period,
            inspector: inspection.inspector,
        })
    }
}

/// 画面に渡すデータ一式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// 炉の選択肢（並べ替え済み）
    pub unit_options: Vec<String>,
    /// 集計月の選択肢（出現順）
    pub period_options: Vec<String>,
    /// 集計に使った炉
    pub effective_unit: Option<String>,
    /// 絞り込み後の最新記録（なければ空）
    pub latest: RawRecord,
    /// 最新記録の現況表示
    pub snapshot: Option<SnapshotView>,
    /// 月別集計（そのまま）
    pub trend: Vec<MonthlyAggregate>,
    /// 読み込み状態
    pub status: LoadStatus,
}

/// 最新記録と月別集計の組
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub latest: RawRecord,
    pub snapshot: Option<SnapshotView>,
    pub trend: Vec<MonthlyAggregate>,
}

/// 絞り込み済み記録と集計から表示データを作る
///
/// 最新記録は絞り込み後の並びの最後の1件
pub fn assemble(
    filtered: &[&RawRecord],
    trend: Vec<MonthlyAggregate>,
    resolver: &KeyResolver,
) -> ViewModel {
    let latest = filtered.last().map(|r| (*r).clone()).unwrap_or_default();
    let snapshot = SnapshotView::from_record(&latest, resolver);

    ViewModel {
        latest,
        snapshot,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::types::CellValue;

    fn rec(ts: &str, cone_tl: f64) -> RawRecord {
        vec![
            ("ประทับเวลา", CellValue::Text(ts.into())),
            ("ชื่อเตา", CellValue::Text("KilnA".into())),
            ("Cone-บนซ้าย", CellValue::Number(cone_tl)),
            ("Firing Zone1 - %O2 (OP=50%)", CellValue::Number(4.5)),
            ("Firing Zone2 -  %O2 (OP=50%)", CellValue::Number(5.5)),
            ("ตำแหน่ง Firing zone2", CellValue::Text("Abnormal".into())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_assemble_latest_is_last_filtered() {
        let a = rec("1/1/2025", 1000.0);
        let b = rec("1/2/2025", 1100.0);
        let resolver = KeyResolver::standard();

        let view = assemble(&[&a, &b], Vec::new(), &resolver);
        assert_eq!(view.latest, b);

        let snapshot = view.snapshot.expect("現況表示がない");
        assert_eq!(snapshot.timestamp, "1/2/2025");
        assert_eq!(snapshot.cone_grid[0][0].value, Some(1100.0));
        assert_eq!(snapshot.cone_grid[0][0].label, "บนซ้าย");
        assert_eq!(snapshot.ring_grid[1][1].value, None);
    }

    #[test]
    fn test_assemble_empty_defaults() {
        let resolver = KeyResolver::standard();
        let view = assemble(&[], Vec::new(), &resolver);

        assert!(view.latest.is_empty());
        assert!(view.snapshot.is_none());
        assert!(view.trend.is_empty());
    }

    #[test]
    fn test_assemble_passes_trend_through() {
        let resolver = KeyResolver::standard();
        let trend = vec![summarize("January", "KilnA", &[])];
        let view = assemble(&[], trend.clone(), &resolver);
        assert_eq!(view.trend, trend);
    }

    #[test]
    fn test_snapshot_gas_rows_and_leaks() {
        let resolver = KeyResolver::standard();
        let record = rec("1/1/2025", 1000.0);
        let snapshot = SnapshotView::from_record(&record, &resolver).unwrap();

        assert_eq!(snapshot.o2.len(), 3);
        assert_eq!(snapshot.o2[1].operating_point, 50);
        assert_eq!(snapshot.o2[1].zone1, Some(4.5));
        assert_eq!(snapshot.o2[1].zone2, Some(5.5));
        assert_eq!(snapshot.o2[0].zone1, None);

        assert_eq!(snapshot.leaks.len(), 3);
        assert!(!snapshot.leaks[2].is_normal);
        assert_eq!(snapshot.leaks[2].status.as_deref(), Some("Abnormal"));
        assert_eq!(snapshot.leaks[0].status, None);
    }
}
