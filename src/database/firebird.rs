//! Firebird adapter.
//!
//! No Firebird wire transport is bundled; the default driver fails at
//! connect time and a real transport can be injected through
//! [`FirebirdAdapter::with_driver`].

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Driver, UnavailableDriver};
use crate::database::traits::DataAdapter;

/// Firebird data adapter. Parses `firebird:`-prefixed connection strings.
pub struct FirebirdAdapter {
    info: ConnectionInfo,
    driver: Box<dyn Driver>,
}

impl FirebirdAdapter {
    pub fn new() -> Self {
        Self::with_driver(Box::new(UnavailableDriver::new("firebird")))
    }

    /// Builds the adapter around a caller-supplied wire driver.
    pub fn with_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            info: ConnectionInfo::default(),
            driver,
        }
    }
}

impl Default for FirebirdAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAdapter for FirebirdAdapter {
    fn name(&self) -> &'static str {
        "firebird"
    }

    fn dsn_prefix(&self) -> &'static str {
        "firebird"
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
    use crate::error::AdapterError;

    #[tokio::test]
    async fn test_default_driver_fails_at_connect() {
        let mut adapter = FirebirdAdapter::new();
        adapter
            .parse("firebird:dbname=localhost:/db/employee.fdb;uid=sysdba;pwd=masterkey")
            .unwrap();
        assert_eq!(adapter.connection_info().user_id, "sysdba");

        let err = adapter.test().await.unwrap_err();
        assert!(matches!(err, AdapterError::ConnectionFailed(_)));
        assert!(err.to_string().contains("could not find driver"));
    }
}
