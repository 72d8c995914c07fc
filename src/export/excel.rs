//! Excel生成（CLI版）
//!
//! ワークブックは共通ライブラリで組み立て、ここではファイルに書くだけ

use crate::error::{KilnError, Result};
use kiln_common::export::excel_core::generate_excel_buffer;
use kiln_common::MonthlyAggregate;
use std::path::Path;

pub fn write_excel(trend: &[MonthlyAggregate], path: &Path) -> Result<()> {
    let buffer =
        generate_excel_buffer(trend).map_err(|e| KilnError::Export(e.to_string()))?;
    std::fs::write(path, buffer)?;
    Ok(())
}
