//! Oracle adapter.
//!
//! No Oracle wire transport is bundled; the default driver fails at
//! connect time and a real transport can be injected through
//! [`OracleAdapter::with_driver`].

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Driver, UnavailableDriver};
use crate::database::traits::DataAdapter;

/// Oracle data adapter. Parses `oci:`-prefixed connection strings.
pub struct OracleAdapter {
    info: ConnectionInfo,
    driver: Box<dyn Driver>,
}

impl OracleAdapter {
    pub fn new() -> Self {
        Self::with_driver(Box::new(UnavailableDriver::new("oracle")))
    }

    /// Builds the adapter around a caller-supplied wire driver.
    pub fn with_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            info: ConnectionInfo::default(),
            driver,
        }
    }
}

impl Default for OracleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAdapter for OracleAdapter {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn dsn_prefix(&self) -> &'static str {
        "oci"
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

    #[test]
    fn test_parse_oci_connection_string() {
        let mut adapter = OracleAdapter::new();
        adapter
            .parse("oci:dbname=//db.example.com:1521/XE;uid=scott;pwd=tiger")
            .unwrap();
        assert_eq!(adapter.connection_info().user_id, "scott");
        assert_eq!(adapter.connection_info().password, "tiger");
        assert_eq!(adapter.connection_info().dsn, "dbname=//db.example.com:1521/XE");
    }
}
