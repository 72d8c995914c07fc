//! 正規フィールド定義
//!
//! スプレッドシートのヘッダ名は改訂のたびに表記が変わっているため、
//! 計測項目ごとに正規ID（`cone@top-left` など）を定め、
//! 過去に使われた表記の一覧を優先順で持たせる。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 点検日時（Googleフォームのタイムスタンプ）
pub const TIMESTAMP_HEADER: &str = "ประทับเวลา";
/// 炉の名前
pub const UNIT_HEADER: &str = "ชื่อเตา";
/// 集計月
pub const PERIOD_HEADER: &str = "Month";
/// 点検者
pub const INSPECTOR_HEADER: &str = "ผู้ตรวจสอบ";

/// 温度測定位置（3×3）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl GridPosition {
    /// 行優先の並び
    pub const ALL: [GridPosition; 9] = [
        GridPosition::TopLeft,
        GridPosition::TopCenter,
        GridPosition::TopRight,
        GridPosition::MiddleLeft,
        GridPosition::Center,
        GridPosition::MiddleRight,
        GridPosition::BottomLeft,
        GridPosition::BottomCenter,
        GridPosition::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// (行, 列)
    pub fn row_col(self) -> (usize, usize) {
        (self.index() / 3, self.index() % 3)
    }

    /// 正規ID用のスラッグ
    pub fn slug(self) -> &'static str {
        match self {
            GridPosition::TopLeft => "top-left",
            GridPosition::TopCenter => "top-center",
            GridPosition::TopRight => "top-right",
            GridPosition::MiddleLeft => "middle-left",
            GridPosition::Center => "center",
            GridPosition::MiddleRight => "middle-right",
            GridPosition::BottomLeft => "bottom-left",
            GridPosition::BottomCenter => "bottom-center",
            GridPosition::BottomRight => "bottom-right",
        }
    }

    /// スプレッドシート上の位置ラベル
    pub fn label(self) -> &'static str {
        match self {
            GridPosition::TopLeft => "บนซ้าย",
            GridPosition::TopCenter => "บนกลาง",
            GridPosition::TopRight => "บนขวา",
            GridPosition::MiddleLeft => "กลางซ้าย",
            GridPosition::Center => "กลางกลาง",
            GridPosition::MiddleRight => "กลางขวา",
            GridPosition::BottomLeft => "ล่างซ้าย",
            GridPosition::BottomCenter => "ล่างกลาง",
            GridPosition::BottomRight => "ล่างขวา",
        }
    }

    fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug() == s)
    }
}

/// 温度計測器の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Cone,
    Ring,
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Cone, Instrument::Ring];

    pub fn prefix(self) -> &'static str {
        match self {
            Instrument::Cone => "Cone",
            Instrument::Ring => "Ring",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Instrument::Cone => "cone",
            Instrument::Ring => "ring",
        }
    }
}

/// 燃焼ゾーン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FiringZone {
    Zone1,
    Zone2,
}

impl FiringZone {
    pub const ALL: [FiringZone; 2] = [FiringZone::Zone1, FiringZone::Zone2];

    pub fn number(self) -> u8 {
        match self {
            FiringZone::Zone1 => 1,
            FiringZone::Zone2 => 2,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// ガス成分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasMetric {
    O2,
    Co2,
    Co,
}

impl GasMetric {
    pub const ALL: [GasMetric; 3] = [GasMetric::O2, GasMetric::Co2, GasMetric::Co];

    /// ヘッダ内の表記
    pub fn token(self) -> &'static str {
        match self {
            GasMetric::O2 => "%O2",
            GasMetric::Co2 => "%CO2",
            GasMetric::Co => "CO(ppm)",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            GasMetric::O2 => "o2",
            GasMetric::Co2 => "co2",
            GasMetric::Co => "co",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            GasMetric::O2 | GasMetric::Co2 => "%",
            GasMetric::Co => "ppm",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 運転負荷（OP）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatingPoint {
    Op0,
    Op50,
    Op100,
}

impl OperatingPoint {
    pub const ALL: [OperatingPoint; 3] = [
        OperatingPoint::Op0,
        OperatingPoint::Op50,
        OperatingPoint::Op100,
    ];

    pub fn percent(self) -> u8 {
        match self {
            OperatingPoint::Op0 => 0,
            OperatingPoint::Op50 => 50,
            OperatingPoint::Op100 => 100,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn from_percent(p: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.percent() == p)
    }
}

/// ガス漏れセンサーの位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakChannel {
    Main,
    Zone1,
    Zone2,
}

impl LeakChannel {
    pub const ALL: [LeakChannel; 3] = [LeakChannel::Main, LeakChannel::Zone1, LeakChannel::Zone2];

    pub fn slug(self) -> &'static str {
        match self {
            LeakChannel::Main => "main",
            LeakChannel::Zone1 => "zone1",
            LeakChannel::Zone2 => "zone2",
        }
    }

    /// 画面表示用の名称
    pub fn display_name(self) -> &'static str {
        match self {
            LeakChannel::Main => "Main Gas Line",
            LeakChannel::Zone1 => "Firing Zone 1",
            LeakChannel::Zone2 => "Firing Zone 2",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == s)
    }

    fn ppm_headers(self) -> Vec<String> {
        match self {
            LeakChannel::Main => vec!["Main gas - ค่าที่วัดได้ (ppm)".into()],
            LeakChannel::Zone1 => vec![
                "Firing zone 1 - ค่าที่วัดได้ (ppm)".into(),
                "Firing zone1 - ค่าที่วัดได้ (ppm)".into(),
            ],
            LeakChannel::Zone2 => vec![
                "Firing zone 2 - ค่าที่วัดได้ (ppm)".into(),
                "Firing zone2 - ค่าที่วัดได้ (ppm)".into(),
            ],
        }
    }

    fn status_headers(self) -> Vec<String> {
        match self {
            LeakChannel::Main => vec!["ตำแหน่ง Main gas".into()],
            LeakChannel::Zone1 => vec![
                "ตำแหน่ง Firing zone1".into(),
                "ตำแหน่ง Firing zone 1".into(),
            ],
            LeakChannel::Zone2 => vec![
                "ตำแหน่ง Firing zone2".into(),
                "ตำแหน่ง Firing zone 2".into(),
            ],
        }
    }
}

/// 値の種類（未検出時の既定値を決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Textual,
}

/// 正規フィールドID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Timestamp,
    Unit,
    Period,
    Inspector,
    Thermal(Instrument, GridPosition),
    Gas(FiringZone, GasMetric, OperatingPoint),
    LeakPpm(LeakChannel),
    LeakStatus(LeakChannel),
}

impl Field {
    /// 全フィールド
    pub fn all() -> Vec<Field> {
        let mut fields = vec![Field::Timestamp, Field::Unit, Field::Period, Field::Inspector];

        for instrument in Instrument::ALL {
            for pos in GridPosition::ALL {
                fields.push(Field::Thermal(instrument, pos));
            }
        }
        for zone in FiringZone::ALL {
            for metric in GasMetric::ALL {
                for op in OperatingPoint::ALL {
                    fields.push(Field::Gas(zone, metric, op));
                }
            }
        }
        for channel in LeakChannel::ALL {
            fields.push(Field::LeakPpm(channel));
            fields.push(Field::LeakStatus(channel));
        }

        fields
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Thermal(..) | Field::Gas(..) | Field::LeakPpm(_) => FieldKind::Numeric,
            Field::Timestamp
            | Field::Unit
            | Field::Period
            | Field::Inspector
            | Field::LeakStatus(_) => FieldKind::Textual,
        }
    }

    /// 組み込みのヘッダ表記（優先順）
    pub fn builtin_headers(&self) -> Vec<String> {
        match *self {
            Field::Timestamp => vec![TIMESTAMP_HEADER.into()],
            Field::Unit => vec![UNIT_HEADER.into()],
            Field::Period => vec![PERIOD_HEADER.into()],
            Field::Inspector => vec![INSPECTOR_HEADER.into()],
            Field::Thermal(instrument, pos) => {
                let (prefix, label) = (instrument.prefix(), pos.label());
                vec![
                    format!("{}-{}", prefix, label),
                    format!("{} - {}", prefix, label),
                    format!("{} {}", prefix, label),
                ]
            }
            Field::Gas(zone, metric, op) => {
                let (z, token, p) = (zone.number(), metric.token(), op.percent());
                vec![
                    format!("Firing Zone{} - {} (OP={}%)", z, token, p),
                    format!("Firing Zone{} -  {} (OP={}%)", z, token, p),
                    format!("Firing Zone{} - {}  (OP={}%)", z, token, p),
                ]
            }
            Field::LeakPpm(channel) => channel.ppm_headers(),
            Field::LeakStatus(channel) => channel.status_headers(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Timestamp => write!(f, "timestamp"),
            Field::Unit => write!(f, "unit"),
            Field::Period => write!(f, "period"),
            Field::Inspector => write!(f, "inspector"),
            Field::Thermal(instrument, pos) => write!(f, "{}@{}", instrument.slug(), pos.slug()),
            Field::Gas(zone, metric, op) => {
                write!(f, "zone{}/{}@op{}", zone.number(), metric.slug(), op.percent())
            }
            Field::LeakPpm(channel) => write!(f, "leak/{}/ppm", channel.slug()),
            Field::LeakStatus(channel) => write!(f, "leak/{}/status", channel.slug()),
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().to_lowercase();
        let unknown = || Error::UnknownField(s.to_string());

        match id.as_str() {
            "timestamp" => return Ok(Field::Timestamp),
            "unit" => return Ok(Field::Unit),
            "period" => return Ok(Field::Period),
            "inspector" => return Ok(Field::Inspector),
            _ => {}
        }

        // cone@top-left / ring@center
        if let Some((head, pos)) = id.split_once('@') {
            let instrument = match head {
                "cone" => Some(Instrument::Cone),
                "ring" => Some(Instrument::Ring),
                _ => None,
            };
            if let Some(instrument) = instrument {
                let pos = GridPosition::from_slug(pos).ok_or_else(unknown)?;
                return Ok(Field::Thermal(instrument, pos));
            }
        }

        // zone1/o2@op50
        if let Some(rest) = id.strip_prefix("zone") {
            let (zone, rest) = rest.split_once('/').ok_or_else(unknown)?;
            let (metric, op) = rest.split_once("@op").ok_or_else(unknown)?;
            let zone = match zone {
                "1" => FiringZone::Zone1,
                "2" => FiringZone::Zone2,
                _ => return Err(unknown()),
            };
            let metric = GasMetric::ALL
                .into_iter()
                .find(|m| m.slug() == metric)
                .ok_or_else(unknown)?;
            let op = op
                .parse::<u8>()
                .ok()
                .and_then(OperatingPoint::from_percent)
                .ok_or_else(unknown)?;
            return Ok(Field::Gas(zone, metric, op));
        }

        // leak/main/ppm / leak/zone1/status
        if let Some(rest) = id.strip_prefix("leak/") {
            let (channel, what) = rest.split_once('/').ok_or_else(unknown)?;
            let channel = LeakChannel::from_slug(channel).ok_or_else(unknown)?;
            return match what {
                "ppm" => Ok(Field::LeakPpm(channel)),
                "status" => Ok(Field::LeakStatus(channel)),
                _ => Err(unknown()),
            };
        }

        Err(unknown())
    }
}
