//! Normalized query results.

use crate::database::types::LogicalType;
use serde::Serialize;

/// Cell value in a normalized result set.
///
/// Serializes untagged: `Null` becomes JSON `null`, `Bytes` a number array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Int(i64),
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Type-tagged tabular query result.
///
/// Invariant: `types.len() == columns.len() == count`, and every row holds
/// exactly `count` cells.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub types: Vec<LogicalType>,
    pub rows: Vec<Vec<CellValue>>,
    pub count: usize,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<String>, types: Vec<LogicalType>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert_eq!(columns.len(), types.len());
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        let count = columns.len();
        Self {
            columns,
            types,
            rows,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_counts_columns() {
        let result = QueryResult::new(
            vec!["id".into(), "name".into()],
            vec![LogicalType::Int, LogicalType::String],
            vec![vec![CellValue::Int(1), CellValue::Text("a".into())]],
        );
        assert_eq!(result.count, 2);
        assert_eq!(result.columns.len(), result.types.len());
        assert!(result.rows.iter().all(|row| row.len() == result.count));
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult::empty();
        assert_eq!(result.count, 0);
        assert!(result.columns.is_empty());
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_cell_value_serialization() {
        let row = vec![
            CellValue::Null,
            CellValue::Int(42),
            CellValue::Number(1.5),
            CellValue::Text("x".into()),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, "[null,42,1.5,\"x\"]");
    }

    #[test]
    fn test_cell_value_accessors() {
        assert!(CellValue::Null.is_null());
        assert_eq!(CellValue::Int(7).as_i64(), Some(7));
        assert_eq!(CellValue::Text("a".into()).as_text(), Some("a"));
        assert_eq!(CellValue::Int(7).as_text(), None);
    }
}
