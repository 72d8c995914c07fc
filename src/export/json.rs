//! JSON出力

use crate::error::Result;
use kiln_common::MonthlyAggregate;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// 月別集計を整形済みJSON配列として書き出す
pub fn write_json(trend: &[MonthlyAggregate], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, trend)?;
    Ok(())
}
