pub mod csv;
pub mod excel;
pub mod json;

use crate::cli::ExportFormat;
use crate::error::Result;
use kiln_common::MonthlyAggregate;
use std::path::{Path, PathBuf};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

/// 全形式を並べて出力する場合のパス（ファイル指定時は拡張子だけ変える）
fn output_path_for_all(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        parent.join(format!("{}.{}", stem, extension))
    }
}

fn write_one(trend: &[MonthlyAggregate], extension: &str, path: &Path) -> Result<()> {
    match extension {
        "json" => {
            println!("- JSONを生成中...");
            json::write_json(trend, path)?;
            println!("✔ JSON出力: {}", path.display());
        }
        "csv" => {
            println!("- CSVを生成中...");
            csv::write_csv(trend, path)?;
            println!("✔ CSV出力: {}", path.display());
        }
        _ => {
            println!("- Excelを生成中...");
            excel::write_excel(trend, path)?;
            println!("✔ Excel出力: {}", path.display());
        }
    }
    Ok(())
}

/// 月別集計をファイルに出力
///
/// # Returns
/// 書き出したファイルのパス
pub fn export_aggregates(
    trend: &[MonthlyAggregate],
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    if output.extension().is_none() && !output.exists() {
        std::fs::create_dir_all(output)?;
    }

    let extensions: &[&str] = match format {
        ExportFormat::Json => &["json"],
        ExportFormat::Csv => &["csv"],
        ExportFormat::Excel => &["xlsx"],
        ExportFormat::All => &["json", "csv", "xlsx"],
    };

    let mut written = Vec::new();
    for extension in extensions {
        let path = if extensions.len() == 1 {
            output_path_for_format(output, title, extension)
        } else {
            output_path_for_all(output, title, extension)
        };
        write_one(trend, extension, &path)?;
        written.push(path);
    }

    Ok(written)
}
