//! 端末表示
//!
//! 表示データ（DashboardView）を端末用の表に整形する。計算はしない。

use crate::cli::Section;
use kiln_common::view::{GasRow, GridCell};
use kiln_common::{
    DashboardView, FiringZone, GasMetric, GridPosition, Instrument, LeakChannel, LoadStatus,
    MonthlyAggregate, OperatingPoint, SafetyRating, SnapshotView,
};
use std::fmt::Write;

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".into())
}

fn rating_mark(rating: SafetyRating) -> &'static str {
    match rating {
        SafetyRating::Perfect => "✅",
        SafetyRating::Good => "🟡",
        SafetyRating::Warning => "⚠",
    }
}

/// 読み込み状態の1行表示
pub fn status_line(status: &LoadStatus) -> String {
    match status {
        LoadStatus::NotLoaded => "未読み込み".to_string(),
        LoadStatus::Loaded { records } => format!("✔ {}件の点検記録", records),
        LoadStatus::EmptyDataset => "有効な点検記録がありません".to_string(),
        LoadStatus::FetchFailed { message } => format!("⚠ 取得失敗（前回のデータを表示）: {}", message),
        LoadStatus::Unreadable { message } => format!("⚠ 読み込み失敗（前回のデータを表示）: {}", message),
    }
}

fn render_grid(out: &mut String, title: &str, rows: &[Vec<GridCell>]) {
    let _ = writeln!(out, "  {} (°C)", title);
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|c| format!("{:>10} {:>7}", c.label, opt(c.value)))
            .collect();
        let _ = writeln!(out, "   {}", cells.join(" |"));
    }
}

fn render_gas(out: &mut String, metric: GasMetric, rows: &[GasRow]) {
    let _ = writeln!(out, "  {} ({})", metric.token(), metric.unit());
    let _ = writeln!(out, "   {:>6} {:>8} {:>8}", "OP", "Zone1", "Zone2");
    for row in rows {
        let _ = writeln!(
            out,
            "   {:>5}% {:>8} {:>8}",
            row.operating_point,
            opt(row.zone1),
            opt(row.zone2)
        );
    }
}

/// 最新記録の現況表示
pub fn render_snapshot(snapshot: &SnapshotView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🔥 {}  {}", snapshot.unit, snapshot.period);
    let _ = writeln!(out, "  点検日時: {}", snapshot.timestamp);
    if let Some(inspector) = &snapshot.inspector {
        let _ = writeln!(out, "  点検者: {}", inspector);
    }
    let _ = writeln!(out);

    render_grid(&mut out, "Cone", &snapshot.cone_grid);
    render_grid(&mut out, "Ring", &snapshot.ring_grid);
    let _ = writeln!(out);

    render_gas(&mut out, GasMetric::O2, &snapshot.o2);
    render_gas(&mut out, GasMetric::Co2, &snapshot.co2);
    render_gas(&mut out, GasMetric::Co, &snapshot.co);
    let _ = writeln!(out);

    let _ = writeln!(out, "  ガス漏れ");
    for leak in &snapshot.leaks {
        let _ = writeln!(
            out,
            "   {} {:<14} {:>7} ppm  {}",
            if leak.is_normal { "✔" } else { "⚠" },
            leak.label,
            opt(leak.ppm),
            leak.status.as_deref().unwrap_or("-")
        );
    }
    out
}

/// 現況表示（記録がなければ案内のみ）
pub fn render_overview(view: &DashboardView) -> String {
    match &view.snapshot {
        Some(snapshot) => render_snapshot(snapshot),
        None => "該当する点検記録がありません\n".to_string(),
    }
}

fn render_thermal_trend(out: &mut String, trend: &[MonthlyAggregate]) {
    for instrument in Instrument::ALL {
        let _ = writeln!(out, "📈 {} 温度平均 (°C)", instrument.prefix());
        let mut header = format!("  {:<16}", "Month");
        for pos in GridPosition::ALL {
            let _ = write!(header, " {:>8}", pos.slug());
        }
        let _ = writeln!(out, "{}", header);
        for a in trend {
            let mut line = format!("  {:<16}", a.period);
            for pos in GridPosition::ALL {
                let _ = write!(line, " {:>8.1}", a.thermal.get(instrument, pos));
            }
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out);
    }
}

fn render_gas_trend(out: &mut String, trend: &[MonthlyAggregate]) {
    for zone in FiringZone::ALL {
        let _ = writeln!(out, "📈 Firing Zone {} ガス組成平均", zone.number());
        let mut header = format!("  {:<16}", "Month");
        for metric in GasMetric::ALL {
            for op in OperatingPoint::ALL {
                let _ = write!(header, " {:>10}", format!("{}@{}", metric.slug(), op.percent()));
            }
        }
        let _ = writeln!(out, "{}", header);
        for a in trend {
            let mut line = format!("  {:<16}", a.period);
            for metric in GasMetric::ALL {
                for op in OperatingPoint::ALL {
                    let _ = write!(line, " {:>10.1}", a.gas.get(zone, metric, op));
                }
            }
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out);
    }
}

fn render_safety_trend(out: &mut String, trend: &[MonthlyAggregate]) {
    let _ = writeln!(out, "🛡 安全記録");
    let mut header = format!("  {:<16} {:>7}", "Month", "Records");
    for channel in LeakChannel::ALL {
        let _ = write!(header, " {:>10}", channel.slug());
    }
    let _ = writeln!(out, "{} {:>8}  Rating", header, "Normal%");

    for a in trend {
        let mut line = format!("  {:<16} {:>7}", a.period, a.record_count);
        for channel in LeakChannel::ALL {
            let _ = write!(line, " {:>10.1}", a.leak.get(channel));
        }
        let _ = writeln!(
            out,
            "{} {:>7}%  {} {}",
            line,
            a.normal_percent,
            rating_mark(a.safety_rating),
            a.safety_rating
        );
    }
    let _ = writeln!(out);
}

/// 月別集計の表示
pub fn render_trend(trend: &[MonthlyAggregate], section: Section) -> String {
    if trend.is_empty() {
        return "集計できる記録がありません\n".to_string();
    }

    let mut out = String::new();
    if section.includes(Section::Thermal) {
        render_thermal_trend(&mut out, trend);
    }
    if section.includes(Section::Gas) {
        render_gas_trend(&mut out, trend);
    }
    if section.includes(Section::Safety) {
        render_safety_trend(&mut out, trend);
    }
    out
}

/// 炉と集計月の一覧
pub fn render_options(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "炉 ({}):", view.unit_options.len());
    for unit in &view.unit_options {
        let mark = if view.effective_unit.as_deref() == Some(unit.as_str()) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, "  {} {}", mark, unit);
    }
    let _ = writeln!(out, "集計月 ({}):", view.period_options.len());
    for period in &view.period_options {
        let _ = writeln!(out, "    {}", period);
    }
    out
}
