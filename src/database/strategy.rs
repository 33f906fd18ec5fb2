//! Result-set normalization strategies.
//!
//! Two ways of turning a [`RawResultSet`] into a [`QueryResult`]:
//!
//! - **metadata-first** fixes column names and types from driver metadata
//!   before any row is considered; columns without driver type metadata
//!   fall back to inference from their first non-null value.
//! - **row-driven** ignores driver-reported types entirely and infers each
//!   column's type from its values, widening on conflict. For backends
//!   whose upfront metadata is unreliable.
//!
//! The observable `QueryResult` shape is identical either way.

use crate::database::driver::{RawColumn, RawResultSet, RawValue};
use crate::database::result::{CellValue, QueryResult};
use crate::database::types::LogicalType;

/// How an adapter derives column types for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    MetadataFirst,
    RowDriven,
}

/// Normalizes `raw` using the adapter's metadata-mapping and cell-coercion
/// hooks.
pub fn normalize(
    strategy: ExecutionStrategy,
    raw: RawResultSet,
    parse_column_type: &dyn Fn(&RawColumn) -> LogicalType,
    coerce: &dyn Fn(LogicalType, RawValue) -> CellValue,
) -> QueryResult {
    let types: Vec<LogicalType> = match strategy {
        ExecutionStrategy::MetadataFirst => raw
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                if column.type_name.is_some() {
                    parse_column_type(column)
                } else {
                    infer_column(&raw.rows, index)
                }
            })
            .collect(),
        ExecutionStrategy::RowDriven => (0..raw.columns.len())
            .map(|index| infer_column(&raw.rows, index))
            .collect(),
    };

    let columns: Vec<String> = raw.columns.into_iter().map(|c| c.name).collect();
    let rows = convert_rows(raw.rows, &types, coerce);
    QueryResult::new(columns, types, rows)
}

/// Default cell coercion: text converts to the column's logical type and
/// falls back to its textual form when it does not parse.
pub fn default_coerce(logical: LogicalType, raw: RawValue) -> CellValue {
    match raw {
        RawValue::Null => CellValue::Null,
        RawValue::Blob(bytes) => CellValue::Bytes(bytes),
        RawValue::Text(text) => match logical {
            LogicalType::Int => text
                .trim()
                .parse::<i64>()
                .map(CellValue::Int)
                .unwrap_or(CellValue::Text(text)),
            LogicalType::Number => text
                .trim()
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Text(text)),
            LogicalType::String | LogicalType::Datetime | LogicalType::Array => {
                CellValue::Text(text)
            }
        },
    }
}

/// Infers one column's type from its values, widening on conflict.
///
/// Nulls are skipped; an all-null or empty column reads as `string`. A
/// conflict between `int` and `number` widens to `number`; any other
/// conflict widens to `string`.
fn infer_column(rows: &[Vec<RawValue>], index: usize) -> LogicalType {
    let mut inferred: Option<LogicalType> = None;
    for row in rows {
        let value_type = match row.get(index) {
            Some(RawValue::Text(text)) => LogicalType::infer(text),
            Some(RawValue::Blob(_)) => LogicalType::Array,
            Some(RawValue::Null) | None => continue,
        };
        inferred = Some(match inferred {
            None => value_type,
            Some(current) => widen(current, value_type),
        });
        if inferred == Some(LogicalType::String) {
            break;
        }
    }
    inferred.unwrap_or(LogicalType::String)
}

fn widen(current: LogicalType, next: LogicalType) -> LogicalType {
    if current == next {
        current
    } else if matches!(current, LogicalType::Int | LogicalType::Number)
        && matches!(next, LogicalType::Int | LogicalType::Number)
    {
        LogicalType::Number
    } else {
        LogicalType::String
    }
}

fn convert_rows(
    rows: Vec<Vec<RawValue>>,
    types: &[LogicalType],
    coerce: &dyn Fn(LogicalType, RawValue) -> CellValue,
) -> Vec<Vec<CellValue>> {
    rows.into_iter()
        .map(|mut row| {
            // Short or long rows are squared up to the column count.
            row.resize(types.len(), RawValue::Null);
            row.into_iter()
                .zip(types)
                .map(|(value, logical)| coerce(*logical, value))
                .collect()
        })
        .collect()
}
