//! エクスポート共通処理
//!
//! 月別集計を1行1集計の表に平坦化する。CSVとExcelの両方で使う。

#[cfg(feature = "excel")]
pub mod excel_core;

use crate::aggregate::MonthlyAggregate;
use crate::fields::{FiringZone, GasMetric, GridPosition, Instrument, LeakChannel, OperatingPoint};
use crate::types::CellValue;

/// 平坦化した表の列名
pub fn flat_headers() -> Vec<String> {
    let mut headers = vec!["period".to_string(), "unit".to_string(), "records".to_string()];

    for instrument in Instrument::ALL {
        for pos in GridPosition::ALL {
            headers.push(format!("{}_{}", instrument.slug(), pos.slug()));
        }
    }
    for zone in FiringZone::ALL {
        for metric in GasMetric::ALL {
            for op in OperatingPoint::ALL {
                headers.push(format!(
                    "z{}_{}_op{}",
                    zone.number(),
                    metric.slug(),
                    op.percent()
                ));
            }
        }
    }
    for channel in LeakChannel::ALL {
        headers.push(format!("leak_{}", channel.slug()));
    }

    headers.push("normal_percent".to_string());
    headers.push("safety_rating".to_string());
    headers
}

/// 集計1件を `flat_headers` の並びで値に変換
pub fn flat_values(aggregate: &MonthlyAggregate) -> Vec<CellValue> {
    let mut values = vec![
        CellValue::Text(aggregate.period.clone()),
        CellValue::Text(aggregate.unit.clone()),
        CellValue::Number(aggregate.record_count as f64),
    ];

    for instrument in Instrument::ALL {
        for pos in GridPosition::ALL {
            values.push(CellValue::Number(*aggregate.thermal.get(instrument, pos)));
        }
    }
    for zone in FiringZone::ALL {
        for metric in GasMetric::ALL {
            for op in OperatingPoint::ALL {
                values.push(CellValue::Number(*aggregate.gas.get(zone, metric, op)));
            }
        }
    }
    for channel in LeakChannel::ALL {
        values.push(CellValue::Number(*aggregate.leak.get(channel)));
    }

    values.push(CellValue::Number(aggregate.normal_percent as f64));
    values.push(CellValue::Text(aggregate.safety_rating.to_string()));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;

    #[test]
    fn test_headers_and_values_align() {
        let aggregate = summarize("January", "KilnA", &[]);
        assert_eq!(flat_headers().len(), flat_values(&aggregate).len());
        // 3 + 18 + 18 + 3 + 2
        assert_eq!(flat_headers().len(), 44);
    }

    #[test]
    fn test_header_names() {
        let headers = flat_headers();
        assert_eq!(headers[0], "period");
        assert_eq!(headers[3], "cone_top-left");
        assert!(headers.contains(&"ring_bottom-right".to_string()));
        assert!(headers.contains(&"z2_co2_op100".to_string()));
        assert_eq!(headers[headers.len() - 1], "safety_rating");
    }

    #[test]
    fn test_values_leading_columns() {
        let aggregate = summarize("January", "KilnA", &[]);
        let values = flat_values(&aggregate);
        assert_eq!(values[0], CellValue::Text("January".into()));
        assert_eq!(values[2], CellValue::Number(0.0));
        assert_eq!(values[values.len() - 1], CellValue::Text("Warning".into()));
    }
}
