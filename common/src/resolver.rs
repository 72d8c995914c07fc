//! ヘッダ表記ゆれの解決
//!
//! 正規フィールドごとに登録された表記を優先順に調べ、
//! 最初に見つかった空でない値を返す。
//! 値が見つからない場合は `Resolved::Absent` を返し、
//! 「0を計測した」と「列がない」を区別できるようにする。

use crate::error::Result;
use crate::fields::{Field, FieldKind};
use crate::types::{CellValue, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 解決結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// 表記 `key` で値が見つかった
    Present { key: &'a str, value: &'a CellValue },
    /// どの表記にも値がない
    Absent,
}

impl<'a> Resolved<'a> {
    pub fn is_present(&self) -> bool {
        matches!(self, Resolved::Present { .. })
    }

    pub fn value(&self) -> Option<&'a CellValue> {
        match self {
            Resolved::Present { value, .. } => Some(*value),
            Resolved::Absent => None,
        }
    }

    /// 一致したヘッダ名
    pub fn key(&self) -> Option<&'a str> {
        match self {
            Resolved::Present { key, .. } => Some(*key),
            Resolved::Absent => None,
        }
    }

    /// 数値として取得（存在して数値の場合のみ）
    pub fn number(&self) -> Option<f64> {
        self.value().and_then(CellValue::as_number)
    }

    /// 文字列として取得
    pub fn text(&self) -> Option<String> {
        self.value().and_then(CellValue::as_text)
    }
}

/// 追加のヘッダ表記（設定ファイル用）
///
/// キーは正規ID（例: `cone@top-left`）、値は追加表記のリスト。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldAliases {
    pub entries: BTreeMap<String, Vec<String>>,
}

impl FieldAliases {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let aliases: Self = serde_json::from_str(json)?;
        Ok(aliases)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 設定をマージ（後から追加した表記が後ろに並ぶ）
    pub fn merge(&mut self, other: &FieldAliases) {
        for (id, spellings) in &other.entries {
            let target = self.entries.entry(id.clone()).or_default();
            for spelling in spellings {
                if !target.contains(spelling) {
                    target.push(spelling.clone());
                }
            }
        }
    }
}

/// 正規フィールド → ヘッダ表記 の解決器
#[derive(Debug, Clone)]
pub struct KeyResolver {
    variants: HashMap<Field, Vec<String>>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeyResolver {
    /// 組み込み表記のみの解決器
    pub fn standard() -> Self {
        let variants = Field::all()
            .into_iter()
            .map(|field| (field, field.builtin_headers()))
            .collect();
        Self { variants }
    }

    /// 追加表記を組み込み表記の後ろに登録する
    ///
    /// 不明な正規IDはエラー
    pub fn with_aliases(mut self, aliases: &FieldAliases) -> Result<Self> {
        for (id, spellings) in &aliases.entries {
            let field: Field = id.parse()?;
            let list = self.variants.entry(field).or_default();
            for spelling in spellings {
                let spelling = spelling.trim().to_string();
                if !spelling.is_empty() && !list.contains(&spelling) {
                    list.push(spelling);
                }
            }
        }
        Ok(self)
    }

    /// 登録済みの表記（優先順）
    pub fn variants(&self, field: Field) -> &[String] {
        self.variants.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 表記を優先順に調べて最初の空でない値を返す
    pub fn resolve<'a>(&'a self, record: &'a RawRecord, field: Field) -> Resolved<'a> {
        for key in self.variants(field) {
            if let Some(value) = record.get(key) {
                if !value.is_blank() {
                    return Resolved::Present { key, value };
                }
            }
        }
        Resolved::Absent
    }

    /// 解決済みの値、なければ既定値（数値は0、文字列はnull）
    pub fn value_or_default(&self, record: &RawRecord, field: Field) -> CellValue {
        match self.resolve(record, field) {
            Resolved::Present { value, .. } => value.clone(),
            Resolved::Absent => match field.kind() {
                FieldKind::Numeric => CellValue::Number(0.0),
                FieldKind::Textual => CellValue::Null,
            },
        }
    }

    pub fn number(&self, record: &RawRecord, field: Field) -> Option<f64> {
        self.resolve(record, field).number()
    }

    pub fn text(&self, record: &RawRecord, field: Field) -> Option<String> {
        self.resolve(record, field).text()
    }

    /// トリム済みの文字列（なければ空文字）
    pub fn trimmed_text(&self, record: &RawRecord, field: Field) -> String {
        self.text(record, field)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FiringZone, GasMetric, GridPosition, Instrument, OperatingPoint};

    fn record(pairs: &[(&str, CellValue)]) -> RawRecord {
        pairs.iter().cloned().collect()
    }

    const CONE_TL: Field = Field::Thermal(Instrument::Cone, GridPosition::TopLeft);

    #[test]
    fn test_resolve_spaced_dash_variant() {
        let resolver = KeyResolver::standard();
        let rec = record(&[("Cone - บนซ้าย", CellValue::Number(1180.0))]);

        let resolved = resolver.resolve(&rec, CONE_TL);
        assert_eq!(resolved.key(), Some("Cone - บนซ้าย"));
        assert_eq!(resolved.number(), Some(1180.0));
    }

    #[test]
    fn test_resolve_priority_order() {
        let resolver = KeyResolver::standard();
        let rec = record(&[
            ("Cone บนซ้าย", CellValue::Number(3.0)),
            ("Cone-บนซ้าย", CellValue::Number(1.0)),
            ("Cone - บนซ้าย", CellValue::Number(2.0)),
        ]);

        assert_eq!(resolver.number(&rec, CONE_TL), Some(1.0));
    }

    #[test]
    fn test_resolve_skips_blank_variant() {
        let resolver = KeyResolver::standard();
        let rec = record(&[
            ("Cone-บนซ้าย", CellValue::Null),
            ("Cone - บนซ้าย", CellValue::Text("  ".to_string())),
            ("Cone บนซ้าย", CellValue::Number(5.0)),
        ]);

        assert_eq!(resolver.resolve(&rec, CONE_TL).key(), Some("Cone บนซ้าย"));
    }

    #[test]
    fn test_resolve_zero_is_present() {
        // 0は「未計測」ではなく計測値として扱う
        let resolver = KeyResolver::standard();
        let rec = record(&[
            ("Cone-บนซ้าย", CellValue::Number(0.0)),
            ("Cone - บนซ้าย", CellValue::Number(9.0)),
        ]);

        let resolved = resolver.resolve(&rec, CONE_TL);
        assert!(resolved.is_present());
        assert_eq!(resolved.number(), Some(0.0));
    }

    #[test]
    fn test_resolve_absent_defaults() {
        let resolver = KeyResolver::standard();
        let rec = RawRecord::new();

        assert_eq!(resolver.resolve(&rec, CONE_TL), Resolved::Absent);
        assert_eq!(resolver.value_or_default(&rec, CONE_TL), CellValue::Number(0.0));
        assert_eq!(resolver.value_or_default(&rec, Field::Inspector), CellValue::Null);
    }

    #[test]
    fn test_resolve_gas_double_space() {
        let resolver = KeyResolver::standard();
        let rec = record(&[("Firing Zone1 -  %CO2 (OP=50%)", CellValue::Number(8.4))]);
        let field = Field::Gas(FiringZone::Zone1, GasMetric::Co2, OperatingPoint::Op50);

        assert_eq!(resolver.number(&rec, field), Some(8.4));
    }

    #[test]
    fn test_with_aliases_appends_lowest_priority() {
        let aliases = FieldAliases::from_json(r#"{"cone@top-left": ["Cone_TL"]}"#).unwrap();
        let resolver = KeyResolver::standard().with_aliases(&aliases).unwrap();

        let variants = resolver.variants(CONE_TL);
        assert_eq!(variants.last().map(String::as_str), Some("Cone_TL"));

        let rec = record(&[("Cone_TL", CellValue::Number(42.0))]);
        assert_eq!(resolver.number(&rec, CONE_TL), Some(42.0));
    }

    #[test]
    fn test_with_aliases_unknown_id() {
        let aliases = FieldAliases::from_json(r#"{"cone@outside": ["X"]}"#).unwrap();
        let result = KeyResolver::standard().with_aliases(&aliases);
        assert!(result.is_err());
    }

    #[test]
    fn test_aliases_merge_dedup() {
        let mut base = FieldAliases::from_json(r#"{"unit": ["Kiln"]}"#).unwrap();
        let other = FieldAliases::from_json(r#"{"unit": ["Kiln", "Furnace"], "period": ["เดือน"]}"#).unwrap();
        base.merge(&other);

        assert_eq!(base.entries["unit"], vec!["Kiln", "Furnace"]);
        assert_eq!(base.entries["period"], vec!["เดือน"]);
    }
}
