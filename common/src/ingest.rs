//! CSV取り込み
//!
//! スプレッドシートのCSVエクスポートを RawRecord の列に変換する。
//!
//! ## 処理フロー
//! 1. ヘッダ名の前後空白を除去
//! 2. 各セルを数値に変換（できなければ文字列、空ならnull）
//! 3. タイムスタンプが空の行（未完了の回答）を除外

use crate::error::Result;
use crate::fields::TIMESTAMP_HEADER;
use crate::types::{CellValue, RawRecord};
use regex::Regex;

/// 取り込み結果
#[derive(Debug, Clone, PartialEq)]
pub enum Ingested {
    /// 1件以上の有効な記録
    Records(Vec<RawRecord>),
    /// 読み込みは成功したが有効な行がない
    EmptyDataset,
}

impl Ingested {
    fn from_records(records: Vec<RawRecord>) -> Self {
        if records.is_empty() {
            Ingested::EmptyDataset
        } else {
            Ingested::Records(records)
        }
    }

    /// 記録の取り出し（EmptyDatasetは空Vec）
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            Ingested::Records(records) => records,
            Ingested::EmptyDataset => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Ingested::Records(records) => records.len(),
            Ingested::EmptyDataset => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 10進数リテラルとして読める文字列を数値に変換
///
/// `NaN` や `inf`、桁区切り付きの値は数値にしない
pub fn parse_number(text: &str) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref NUMBER_RE: Regex =
            Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").unwrap();
    }

    if !NUMBER_RE.is_match(text) {
        return None;
    }
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// セル文字列を型付きの値に変換
pub fn coerce_cell(raw: &str) -> CellValue {
    if raw.trim().is_empty() {
        return CellValue::Null;
    }
    match parse_number(raw) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(raw.to_string()),
    }
}

/// タイムスタンプがある行のみ有効
fn has_timestamp(record: &RawRecord) -> bool {
    record
        .get(TIMESTAMP_HEADER)
        .map(|v| !v.is_blank())
        .unwrap_or(false)
}

/// CSV文字列をパース
pub fn parse_csv(text: &str) -> Result<Ingested> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(row.iter().map(coerce_cell).collect::<Vec<_>>());
    }

    Ok(records_from_rows(&headers, rows))
}

/// ヘッダと型付きセル行から記録を組み立てる
///
/// Excel読み込みもこの関数を通し、CSVと同じ規則を適用する
pub fn records_from_rows<I>(headers: &[String], rows: I) -> Ingested
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let mut total = 0usize;
    let mut records = Vec::new();

    for row in rows {
        total += 1;
        let mut record = RawRecord::new();
        for (header, value) in headers.iter().zip(row) {
            let key = header.trim();
            if key.is_empty() {
                continue;
            }
            // 同名ヘッダは右側の列が優先
            record.insert(key, value);
        }

        if has_timestamp(&record) {
            records.push(record);
        }
    }

    let dropped = total - records.len();
    if dropped > 0 {
        log::debug!("タイムスタンプのない行を除外: {}件", dropped);
    }
    log::debug!("取り込み完了: {}件 / {}行", records.len(), total);

    Ingested::from_records(records)
}
