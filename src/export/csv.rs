//! CSV出力（1行1集計）

use crate::error::Result;
use kiln_common::export::{flat_headers, flat_values};
use kiln_common::{CellValue, MonthlyAggregate};
use std::path::Path;

/// 月別集計を平坦化したCSVを書き出す
pub fn write_csv(trend: &[MonthlyAggregate], path: &Path) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(path)?;
    writer.write_record(flat_headers())?;

    for aggregate in trend {
        let row: Vec<String> = flat_values(aggregate)
            .iter()
            .map(|v| match v {
                CellValue::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
