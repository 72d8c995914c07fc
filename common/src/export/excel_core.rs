//! Excel生成（共通ライブラリ）
//!
//! 月別集計を「温度」「ガス組成」「安全記録」の3シートにまとめた
//! ワークブックをメモリ上に作る。

use crate::aggregate::{MonthlyAggregate, SafetyRating};
use crate::error::{Error, Result};
use crate::fields::{FiringZone, GasMetric, GridPosition, Instrument, LeakChannel, OperatingPoint};
use rust_xlsxwriter::*;

const PERIOD_COL_WIDTH: f64 = 16.0;
const UNIT_COL_WIDTH: f64 = 12.0;
const VALUE_COL_WIDTH: f64 = 11.0;

fn excel_err(context: &'static str) -> impl Fn(XlsxError) -> Error {
    move |e| Error::Excel(format!("{}: {}", context, e))
}

struct Formats {
    header: Format,
    text: Format,
    number: Format,
    perfect: Format,
    good: Format,
    warning: Format,
}

impl Formats {
    fn new() -> Self {
        let base = Format::new()
            .set_font_size(10.0)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Hair)
            .set_border_color(Color::RGB(0xCCCCCC));

        let rating = |color: u32| {
            base.clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_font_color(Color::RGB(color))
        };

        Self {
            header: Format::new()
                .set_bold()
                .set_font_size(9.0)
                .set_font_color(Color::RGB(0x555555))
                .set_background_color(Color::RGB(0xF5F5F5))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Hair)
                .set_border_color(Color::RGB(0xAAAAAA)),
            text: base.clone().set_align(FormatAlign::Left),
            number: base.clone().set_num_format("0.0"),
            perfect: rating(0x2E7D32),
            good: rating(0xF9A825),
            warning: rating(0xC62828),
        }
    }

    fn rating(&self, rating: SafetyRating) -> &Format {
        match rating {
            SafetyRating::Perfect => &self.perfect,
            SafetyRating::Good => &self.good,
            SafetyRating::Warning => &self.warning,
        }
    }
}

/// シートを追加し、見出し行と先頭2列（集計月・炉）を書く
fn begin_sheet<'a>(
    workbook: &'a mut Workbook,
    name: &str,
    headers: &[String],
    aggregates: &[MonthlyAggregate],
    formats: &Formats,
) -> Result<&'a mut Worksheet> {
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(name)
        .map_err(excel_err("シート名設定エラー"))?;

    worksheet
        .set_column_width(0, PERIOD_COL_WIDTH)
        .map_err(excel_err("列幅設定エラー"))?;
    worksheet
        .set_column_width(1, UNIT_COL_WIDTH)
        .map_err(excel_err("列幅設定エラー"))?;
    for col in 2..headers.len() {
        worksheet
            .set_column_width(col as u16, VALUE_COL_WIDTH)
            .map_err(excel_err("列幅設定エラー"))?;
    }

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &formats.header)
            .map_err(excel_err("見出し書き込みエラー"))?;
    }
    worksheet
        .set_freeze_panes(1, 2)
        .map_err(excel_err("ウィンドウ枠固定エラー"))?;

    for (i, aggregate) in aggregates.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet
            .write_string_with_format(row, 0, &aggregate.period, &formats.text)
            .map_err(excel_err("値書き込みエラー"))?;
        worksheet
            .write_string_with_format(row, 1, &aggregate.unit, &formats.text)
            .map_err(excel_err("値書き込みエラー"))?;
    }

    Ok(worksheet)
}

fn write_numbers(
    worksheet: &mut Worksheet,
    row: u32,
    first_col: u16,
    values: &[f64],
    format: &Format,
) -> Result<()> {
    for (offset, value) in values.iter().enumerate() {
        worksheet
            .write_number_with_format(row, first_col + offset as u16, *value, format)
            .map_err(excel_err("値書き込みエラー"))?;
    }
    Ok(())
}

fn thermal_sheet(
    workbook: &mut Workbook,
    aggregates: &[MonthlyAggregate],
    formats: &Formats,
) -> Result<()> {
    let mut headers = vec!["Month".to_string(), "Unit".to_string()];
    for instrument in Instrument::ALL {
        for pos in GridPosition::ALL {
            headers.push(format!("{} {}", instrument.prefix(), pos.label()));
        }
    }

    let worksheet = begin_sheet(workbook, "Thermal", &headers, aggregates, formats)?;
    for (i, aggregate) in aggregates.iter().enumerate() {
        let values: Vec<f64> = Instrument::ALL
            .into_iter()
            .flat_map(|instrument| {
                GridPosition::ALL
                    .into_iter()
                    .map(move |pos| *aggregate.thermal.get(instrument, pos))
            })
            .collect();
        write_numbers(worksheet, i as u32 + 1, 2, &values, &formats.number)?;
    }
    Ok(())
}

fn gas_sheet(
    workbook: &mut Workbook,
    aggregates: &[MonthlyAggregate],
    formats: &Formats,
) -> Result<()> {
    let mut columns = Vec::new();
    for zone in FiringZone::ALL {
        for metric in GasMetric::ALL {
            for op in OperatingPoint::ALL {
                columns.push((zone, metric, op));
            }
        }
    }

    let mut headers = vec!["Month".to_string(), "Unit".to_string()];
    headers.extend(columns.iter().map(|(zone, metric, op)| {
        format!("Zone{} {} OP{}%", zone.number(), metric.token(), op.percent())
    }));

    let worksheet = begin_sheet(workbook, "Gas", &headers, aggregates, formats)?;
    for (i, aggregate) in aggregates.iter().enumerate() {
        let values: Vec<f64> = columns
            .iter()
            .map(|(zone, metric, op)| *aggregate.gas.get(*zone, *metric, *op))
            .collect();
        write_numbers(worksheet, i as u32 + 1, 2, &values, &formats.number)?;
    }
    Ok(())
}

fn safety_sheet(
    workbook: &mut Workbook,
    aggregates: &[MonthlyAggregate],
    formats: &Formats,
) -> Result<()> {
    let mut headers = vec!["Month".to_string(), "Unit".to_string(), "Records".to_string()];
    headers.extend(
        LeakChannel::ALL
            .iter()
            .map(|channel| format!("{} (ppm)", channel.display_name())),
    );
    headers.push("Normal %".to_string());
    headers.push("Rating".to_string());

    let worksheet = begin_sheet(workbook, "Safety Log", &headers, aggregates, formats)?;
    for (i, aggregate) in aggregates.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet
            .write_number_with_format(row, 2, aggregate.record_count as f64, &formats.text)
            .map_err(excel_err("値書き込みエラー"))?;

        let leaks: Vec<f64> = LeakChannel::ALL
            .into_iter()
            .map(|channel| *aggregate.leak.get(channel))
            .collect();
        write_numbers(worksheet, row, 3, &leaks, &formats.number)?;

        let col = 3 + leaks.len() as u16;
        worksheet
            .write_number_with_format(row, col, aggregate.normal_percent as f64, &formats.text)
            .map_err(excel_err("値書き込みエラー"))?;
        worksheet
            .write_string_with_format(
                row,
                col + 1,
                aggregate.safety_rating.to_string(),
                formats.rating(aggregate.safety_rating),
            )
            .map_err(excel_err("値書き込みエラー"))?;
    }
    Ok(())
}

/// 月別集計のExcelをバッファに生成
///
/// # Arguments
/// * `aggregates` - 月別集計（表示順のまま書き出す）
pub fn generate_excel_buffer(aggregates: &[MonthlyAggregate]) -> Result<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    thermal_sheet(&mut workbook, aggregates, &formats)?;
    gas_sheet(&mut workbook, aggregates, &formats)?;
    safety_sheet(&mut workbook, aggregates, &formats)?;

    workbook
        .save_to_buffer()
        .map_err(excel_err("Excel保存エラー"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;

    #[test]
    fn test_generate_excel_buffer_is_zip() {
        let aggregates = vec![
            summarize("January", "KilnA", &[]),
            summarize("February", "KilnA", &[]),
        ];
        let buffer = generate_excel_buffer(&aggregates).unwrap();
        // xlsx は ZIP 形式
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_excel_buffer_empty_series() {
        let buffer = generate_excel_buffer(&[]).unwrap();
        assert!(!buffer.is_empty());
    }
}
