//! ODBC adapter.
//!
//! ODBC bridges report column metadata only as reliably as the driver
//! behind them, so this family uses the row-driven strategy: column types
//! come from the values themselves. No ODBC transport is bundled; a real
//! one can be injected through [`OdbcAdapter::with_driver`].

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Driver, UnavailableDriver};
use crate::database::strategy::ExecutionStrategy;
use crate::database::traits::DataAdapter;

/// ODBC data adapter. Parses `odbc:`-prefixed connection strings.
pub struct OdbcAdapter {
    info: ConnectionInfo,
    driver: Box<dyn Driver>,
}

impl OdbcAdapter {
    pub fn new() -> Self {
        Self::with_driver(Box::new(UnavailableDriver::new("odbc")))
    }

    /// Builds the adapter around a caller-supplied wire driver.
    pub fn with_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            info: ConnectionInfo::default(),
            driver,
        }
    }
}

impl Default for OdbcAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAdapter for OdbcAdapter {
    fn name(&self) -> &'static str {
        "odbc"
    }

    fn dsn_prefix(&self) -> &'static str {
        "odbc"
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::RowDriven
    }

    fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    fn connection_info(&self) -> &ConnectionInfo {
        &self.info
    }

    fn set_connection_info(&mut self, info: ConnectionInfo) {
        self.info = info;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::driver::{RawColumn, RawResultSet, RawValue};
    use crate::database::result::CellValue;
    use crate::database::traits::test_support::FakeDriver;
    use crate::database::types::LogicalType;

    #[tokio::test]
    async fn test_row_driven_ignores_driver_metadata() {
        // The bridge claims everything is a char column; the values say
        // otherwise.
        let raw = RawResultSet {
            columns: vec![
                RawColumn::with_type("id", "SQL_CHAR"),
                RawColumn::with_type("label", "SQL_CHAR"),
            ],
            rows: vec![
                vec![RawValue::Text("1".into()), RawValue::Text("first".into())],
                vec![RawValue::Text("2".into()), RawValue::Text("second".into())],
            ],
        };

        let adapter = OdbcAdapter::with_driver(Box::new(FakeDriver::returning(raw)));
        let result = adapter.execute("SELECT id, label FROM t").await.unwrap();

        assert_eq!(result.types, vec![LogicalType::Int, LogicalType::String]);
        assert_eq!(
            result.rows[0],
            vec![CellValue::Int(1), CellValue::Text("first".into())]
        );
    }

    #[test]
    fn test_odbc_strategy_is_row_driven() {
        assert_eq!(OdbcAdapter::new().strategy(), ExecutionStrategy::RowDriven);
    }
}
