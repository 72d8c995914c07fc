//! Excel/ODSファイルの読み込み
//!
//! 1行目をヘッダとして扱い、CSVと同じ取り込み規則を通す。

use crate::error::{KilnError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use kiln_common::ingest::{coerce_cell, records_from_rows};
use kiln_common::{CellValue, Ingested};
use std::path::Path;

/// 読み込める拡張子
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// セルを型付きの値に変換
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::String(s) => coerce_cell(s),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        // 日付はシリアル値
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => coerce_cell(s),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// ワークブックを読み込む
///
/// # Arguments
/// * `path` - ファイルパス
/// * `sheet` - シート名（省略時は先頭シート）
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Ingested> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| KilnError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| KilnError::Spreadsheet(format!("シートがありません: {}", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| KilnError::Spreadsheet(format!("{}: {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => return Ok(Ingested::EmptyDataset),
    };

    let cells = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>());

    Ok(records_from_rows(&headers, cells))
}
