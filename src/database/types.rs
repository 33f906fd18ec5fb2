//! Logical column types and value-based type inference.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal number literal with optional sign, fraction, and exponent.
static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("valid regex"));

/// Logical type of a result column.
///
/// The closed set every driver's output is normalized into. `Array` stands
/// for binary/opaque content that has no textual rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    String,
    Int,
    Number,
    Datetime,
    Array,
}

impl LogicalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Number => "number",
            Self::Datetime => "datetime",
            Self::Array => "array",
        }
    }

    /// Infers the logical type of a raw textual cell value.
    ///
    /// Total and deterministic. The decision order matters: non-printable
    /// content must be caught before the textual checks, and numeric strings
    /// would otherwise also match some date patterns.
    pub fn infer(value: &str) -> Self {
        if value
            .bytes()
            .any(|b| !(0x20..=0x7e).contains(&b) && !matches!(b, b'\t' | b'\r' | b'\n'))
        {
            return Self::Array;
        }

        if NUMERIC.is_match(value.trim()) {
            return if value.contains('.') {
                Self::Number
            } else {
                Self::Int
            };
        }

        if is_datetime(value) {
            return Self::Datetime;
        }

        Self::String
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_datetime(value: &str) -> bool {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%b-%d").is_ok()
        || NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok()
}
