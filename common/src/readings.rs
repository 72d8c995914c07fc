//! 点検記録の型付き表現
//!
//! RawRecord（ヘッダ名 → セル値）を KeyResolver 経由で一度だけ解決し、
//! 位置・ゾーン・センサーごとの固定構造に落とし込む。
//! 集計と現況表示はこの構造だけを参照する。

use crate::fields::{
    Field, FiringZone, GasMetric, GridPosition, Instrument, LeakChannel, OperatingPoint,
};
use crate::resolver::KeyResolver;
use crate::types::RawRecord;
use serde::{Deserialize, Serialize};

/// 3×3の温度測定値（行優先）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid<T> {
    pub cells: [T; 9],
}

impl<T> Grid<T> {
    pub fn from_fn(mut f: impl FnMut(GridPosition) -> T) -> Self {
        Self {
            cells: std::array::from_fn(|i| f(GridPosition::ALL[i])),
        }
    }

    pub fn get(&self, pos: GridPosition) -> &T {
        &self.cells[pos.index()]
    }

    /// 表示用の3行
    pub fn rows(&self) -> [&[T]; 3] {
        [&self.cells[0..3], &self.cells[3..6], &self.cells[6..9]]
    }
}

/// コーン・リングの温度
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalReadings<T> {
    pub cone: Grid<T>,
    pub ring: Grid<T>,
}

impl<T> ThermalReadings<T> {
    pub fn from_fn(mut f: impl FnMut(Instrument, GridPosition) -> T) -> Self {
        Self {
            cone: Grid::from_fn(|pos| f(Instrument::Cone, pos)),
            ring: Grid::from_fn(|pos| f(Instrument::Ring, pos)),
        }
    }

    pub fn grid(&self, instrument: Instrument) -> &Grid<T> {
        match instrument {
            Instrument::Cone => &self.cone,
            Instrument::Ring => &self.ring,
        }
    }

    pub fn get(&self, instrument: Instrument, pos: GridPosition) -> &T {
        self.grid(instrument).get(pos)
    }
}

/// 1ゾーン分のガス組成（OP 0/50/100%）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneGas<T> {
    pub o2: [T; 3],
    pub co2: [T; 3],
    pub co: [T; 3],
}

impl<T> ZoneGas<T> {
    pub fn from_fn(mut f: impl FnMut(GasMetric, OperatingPoint) -> T) -> Self {
        Self {
            o2: std::array::from_fn(|i| f(GasMetric::O2, OperatingPoint::ALL[i])),
            co2: std::array::from_fn(|i| f(GasMetric::Co2, OperatingPoint::ALL[i])),
            co: std::array::from_fn(|i| f(GasMetric::Co, OperatingPoint::ALL[i])),
        }
    }

    pub fn metric(&self, metric: GasMetric) -> &[T; 3] {
        match metric {
            GasMetric::O2 => &self.o2,
            GasMetric::Co2 => &self.co2,
            GasMetric::Co => &self.co,
        }
    }

    pub fn get(&self, metric: GasMetric, op: OperatingPoint) -> &T {
        &self.metric(metric)[op.index()]
    }
}

/// 燃焼ゾーン1・2のガス組成
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GasReadings<T> {
    pub zone1: ZoneGas<T>,
    pub zone2: ZoneGas<T>,
}

impl<T> GasReadings<T> {
    pub fn from_fn(mut f: impl FnMut(FiringZone, GasMetric, OperatingPoint) -> T) -> Self {
        Self {
            zone1: ZoneGas::from_fn(|m, op| f(FiringZone::Zone1, m, op)),
            zone2: ZoneGas::from_fn(|m, op| f(FiringZone::Zone2, m, op)),
        }
    }

    pub fn zone(&self, zone: FiringZone) -> &ZoneGas<T> {
        match zone {
            FiringZone::Zone1 => &self.zone1,
            FiringZone::Zone2 => &self.zone2,
        }
    }

    pub fn get(&self, zone: FiringZone, metric: GasMetric, op: OperatingPoint) -> &T {
        self.zone(zone).get(metric, op)
    }
}

/// ガス漏れセンサー3箇所
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeakReadings<T> {
    pub main: T,
    pub zone1: T,
    pub zone2: T,
}

impl<T> LeakReadings<T> {
    pub fn from_fn(mut f: impl FnMut(LeakChannel) -> T) -> Self {
        Self {
            main: f(LeakChannel::Main),
            zone1: f(LeakChannel::Zone1),
            zone2: f(LeakChannel::Zone2),
        }
    }

    pub fn get(&self, channel: LeakChannel) -> &T {
        match channel {
            LeakChannel::Main => &self.main,
            LeakChannel::Zone1 => &self.zone1,
            LeakChannel::Zone2 => &self.zone2,
        }
    }
}

/// 漏れ検知ステータスが正常か（大文字小文字を区別しない完全一致）
pub fn is_normal_status(status: &str) -> bool {
    status.to_lowercase() == "normal"
}

/// 点検記録1件（型付き）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub timestamp: String,
    pub unit: String,
    pub period: String,
    pub inspector: Option<String>,
    pub thermal: ThermalReadings<Option<f64>>,
    pub gas: GasReadings<Option<f64>>,
    pub leak_ppm: LeakReadings<Option<f64>>,
    pub leak_status: LeakReadings<Option<String>>,
}

impl Inspection {
    /// RawRecordを解決して型付きの記録にする
    ///
    /// 値がない項目は `None`（0とは区別する）
    pub fn from_record(record: &RawRecord, resolver: &KeyResolver) -> Self {
        Self {
            timestamp: resolver.trimmed_text(record, Field::Timestamp),
            unit: resolver.trimmed_text(record, Field::Unit),
            period: resolver.trimmed_text(record, Field::Period),
            inspector: resolver
                .text(record, Field::Inspector)
                .map(|s| s.trim().to_string()),
            thermal: ThermalReadings::from_fn(|instrument, pos| {
                resolver.number(record, Field::Thermal(instrument, pos))
            }),
            gas: GasReadings::from_fn(|zone, metric, op| {
                resolver.number(record, Field::Gas(zone, metric, op))
            }),
            leak_ppm: LeakReadings::from_fn(|channel| {
                resolver.number(record, Field::LeakPpm(channel))
            }),
            leak_status: LeakReadings::from_fn(|channel| {
                resolver.text(record, Field::LeakStatus(channel))
            }),
        }
    }

    pub fn is_leak_normal(&self, channel: LeakChannel) -> bool {
        self.leak_status
            .get(channel)
            .as_deref()
            .map(is_normal_status)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn sample_record() -> RawRecord {
        vec![
            ("ประทับเวลา", CellValue::Text("1/15/2025 9:30:00".into())),
            ("ชื่อเตา", CellValue::Text(" KilnA ".into())),
            ("Month", CellValue::Text("January".into())),
            ("ผู้ตรวจสอบ", CellValue::Text("Somchai".into())),
            ("Cone-บนซ้าย", CellValue::Number(1180.0)),
            ("Ring - กลางกลาง", CellValue::Number(1175.5)),
            ("Firing Zone2 - CO(ppm) (OP=100%)", CellValue::Number(35.0)),
            ("Main gas - ค่าที่วัดได้ (ppm)", CellValue::Number(0.0)),
            ("ตำแหน่ง Main gas", CellValue::Text("NORMAL".into())),
            ("ตำแหน่ง Firing zone1", CellValue::Text("Leak".into())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_inspection_from_record() {
        let resolver = KeyResolver::standard();
        let inspection = Inspection::from_record(&sample_record(), &resolver);

        assert_eq!(inspection.unit, "KilnA");
        assert_eq!(inspection.period, "January");
        assert_eq!(inspection.inspector.as_deref(), Some("Somchai"));
        assert_eq!(
            *inspection.thermal.get(Instrument::Cone, GridPosition::TopLeft),
            Some(1180.0)
        );
        assert_eq!(
            *inspection.thermal.get(Instrument::Ring, GridPosition::Center),
            Some(1175.5)
        );
        assert_eq!(
            *inspection.thermal.get(Instrument::Ring, GridPosition::TopLeft),
            None
        );
        assert_eq!(
            *inspection
                .gas
                .get(FiringZone::Zone2, GasMetric::Co, OperatingPoint::Op100),
            Some(35.0)
        );
    }

    #[test]
    fn test_inspection_zero_leak_is_measured() {
        let resolver = KeyResolver::standard();
        let inspection = Inspection::from_record(&sample_record(), &resolver);

        assert_eq!(*inspection.leak_ppm.get(LeakChannel::Main), Some(0.0));
        assert_eq!(*inspection.leak_ppm.get(LeakChannel::Zone2), None);
    }

    #[test]
    fn test_leak_status_normal() {
        let resolver = KeyResolver::standard();
        let inspection = Inspection::from_record(&sample_record(), &resolver);

        assert!(inspection.is_leak_normal(LeakChannel::Main));
        assert!(!inspection.is_leak_normal(LeakChannel::Zone1));
        assert!(!inspection.is_leak_normal(LeakChannel::Zone2));
    }

    #[test]
    fn test_is_normal_status_exact() {
        assert!(is_normal_status("Normal"));
        assert!(is_normal_status("normal"));
        assert!(!is_normal_status("normal "));
        assert!(!is_normal_status("abnormal"));
    }

    #[test]
    fn test_grid_rows() {
        let grid = Grid::from_fn(|pos| pos.index());
        let rows = grid.rows();
        assert_eq!(rows[0], &[0, 1, 2]);
        assert_eq!(rows[2], &[6, 7, 8]);
    }
}
