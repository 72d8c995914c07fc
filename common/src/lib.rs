//! Kiln Monitor Common Library
//!
//! 窯点検スプレッドシートの取り込み・正規化・月別集計。
//! CLI から使われる純粋なデータ処理部分（ネットワーク・ファイルI/Oなし）。

pub mod error;
pub mod types;
pub mod fields;
pub mod resolver;
pub mod ingest;
pub mod readings;
pub mod filter;
pub mod period;
pub mod aggregate;
pub mod view;
pub mod state;
pub mod export;

pub use error::{Error, Result};
pub use types::{CellValue, FilterCriteria, RawRecord, Selection};
pub use fields::{Field, FiringZone, GasMetric, GridPosition, Instrument, LeakChannel, OperatingPoint};
pub use resolver::{FieldAliases, KeyResolver, Resolved};
pub use ingest::{parse_csv, records_from_rows, Ingested};
pub use readings::Inspection;
pub use filter::{default_unit, distinct_periods, distinct_units, effective_unit, filter_records};
pub use period::PeriodOrder;
pub use aggregate::{aggregate_by_period, MonthlyAggregate, SafetyRating};
pub use view::{assemble, DashboardView, SnapshotView, ViewModel};
pub use state::{Action, DashboardState, LoadStatus};
