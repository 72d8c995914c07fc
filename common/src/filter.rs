//! 記録の絞り込み
//!
//! 炉・集計月の条件で記録を絞り込む。比較はトリム後の完全一致のみ。

use crate::fields::Field;
use crate::resolver::KeyResolver;
use crate::types::{FilterCriteria, RawRecord, Selection};
use feruca::Collator;
use std::cmp::Ordering;
use std::collections::HashSet;

/// 条件に一致する記録（元の順序を保つ）
pub fn filter_records<'a>(
    records: &'a [RawRecord],
    criteria: &FilterCriteria,
    resolver: &KeyResolver,
) -> Vec<&'a RawRecord> {
    records
        .iter()
        .filter(|r| {
            criteria
                .unit
                .matches(&resolver.trimmed_text(r, Field::Unit))
                && criteria
                    .period
                    .matches(&resolver.trimmed_text(r, Field::Period))
        })
        .collect()
}

/// 重複を除いた値（出現順、空は除く）
fn distinct_values(records: &[RawRecord], resolver: &KeyResolver, field: Field) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| resolver.trimmed_text(r, field))
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// 表示用の並び順で比較する（Unicode照合順、CLDRルート）
///
/// タイ語の前置母音は後続の子音で並び、大文字小文字は同じ文字なら小文字が先。
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

/// 炉の一覧（並べ替え済み）
pub fn distinct_units(records: &[RawRecord], resolver: &KeyResolver) -> Vec<String> {
    let mut units = distinct_values(records, resolver, Field::Unit);
    let mut collator = Collator::default();
    units.sort_by(|a, b| collator.collate(a, b));
    units
}

/// 集計月の一覧（出現順）
pub fn distinct_periods(records: &[RawRecord], resolver: &KeyResolver) -> Vec<String> {
    distinct_values(records, resolver, Field::Period)
}

/// 未選択時の既定の炉（並べ替えて先頭）
pub fn default_unit(records: &[RawRecord], resolver: &KeyResolver) -> Option<String> {
    distinct_units(records, resolver).into_iter().next()
}

/// 集計に使う炉を確定する
///
/// ワイルドカードの場合は既定の炉を使う
pub fn effective_unit(
    records: &[RawRecord],
    selection: &Selection,
    resolver: &KeyResolver,
) -> Option<String> {
    match selection {
        Selection::Only(unit) => Some(unit.trim().to_string()),
        Selection::All => default_unit(records, resolver),
    }
}
