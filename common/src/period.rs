//! 集計月の並び順
//!
//! 集計月は自由記述のラベルなので、既定では記録に現れた順に並べる。
//! `Chronological` を指定すると月名として読めるラベルを年月順に並べ替える。

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 集計月の並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodOrder {
    /// 記録に現れた順
    #[default]
    FirstSeen,
    /// 年月順（読めないラベルは末尾に出現順で）
    Chronological,
}

const ENGLISH_MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

const THAI_MONTH_ABBREVIATIONS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

/// 仏暦の年を西暦に変換（2400より大きい年）
fn normalize_year(year: i32) -> i32 {
    if year > 2400 {
        year - 543
    } else {
        year
    }
}

fn find_year(label: &str) -> Option<i32> {
    lazy_static::lazy_static! {
        static ref YEAR_RE: Regex = Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").unwrap();
    }

    YEAR_RE
        .captures(label)
        .and_then(|cap| cap[1].parse::<i32>().ok())
        .map(normalize_year)
}

/// 月名から月（1-12）を探す
fn find_month_name(label: &str) -> Option<u32> {
    let lower = label.to_lowercase();

    // 完全名を先に調べる（"mar" が "march" より先に当たらないように）
    for (i, name) in ENGLISH_MONTHS.iter().enumerate() {
        if lower.contains(name) {
            return Some(i as u32 + 1);
        }
    }
    for (i, name) in THAI_MONTHS.iter().enumerate() {
        if label.contains(name) {
            return Some(i as u32 + 1);
        }
    }
    for (i, abbr) in THAI_MONTH_ABBREVIATIONS.iter().enumerate() {
        // "ม.ค." は "มี.ค." 等の一部にはならない
        if label.contains(abbr) {
            return Some(i as u32 + 1);
        }
    }

    lazy_static::lazy_static! {
        static ref SHORT_RE: Regex =
            Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)\b").unwrap();
    }
    SHORT_RE.captures(&lower).and_then(|cap| {
        let abbr = &cap[1][..3];
        ENGLISH_MONTHS
            .iter()
            .position(|name| name.starts_with(abbr))
            .map(|i| i as u32 + 1)
    })
}

/// ラベルを (年, 月) に変換
///
/// 年が書かれていないラベルは年0として扱う
pub fn parse_period_label(label: &str) -> Option<(i32, u32)> {
    lazy_static::lazy_static! {
        // 2025-01 / 2025/1
        static ref YEAR_MONTH_RE: Regex = Regex::new(r"^\s*(\d{4})[-/.](\d{1,2})\s*$").unwrap();
        // 01/2025 / 1-2568
        static ref MONTH_YEAR_RE: Regex = Regex::new(r"^\s*(\d{1,2})[-/.](\d{4})\s*$").unwrap();
    }

    let valid = |month: u32| (1..=12).contains(&month);

    if let Some(cap) = YEAR_MONTH_RE.captures(label) {
        let year = cap[1].parse::<i32>().ok()?;
        let month = cap[2].parse::<u32>().ok().filter(|m| valid(*m))?;
        return Some((normalize_year(year), month));
    }
    if let Some(cap) = MONTH_YEAR_RE.captures(label) {
        let month = cap[1].parse::<u32>().ok().filter(|m| valid(*m))?;
        let year = cap[2].parse::<i32>().ok()?;
        return Some((normalize_year(year), month));
    }

    let month = find_month_name(label)?;
    Some((find_year(label).unwrap_or(0), month))
}

/// 集計月を指定の順に並べる
pub fn order_periods(periods: Vec<String>, order: PeriodOrder) -> Vec<String> {
    match order {
        PeriodOrder::FirstSeen => periods,
        PeriodOrder::Chronological => {
            let mut keyed: Vec<(Option<(i32, u32)>, String)> = periods
                .into_iter()
                .map(|p| (parse_period_label(&p), p))
                .collect();
            // 安定ソート: 読めないラベルは末尾で出現順を保つ
            keyed.sort_by(|(a, _), (b, _)| match (a, b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            keyed.into_iter().map(|(_, p)| p).collect()
        }
    }
}
