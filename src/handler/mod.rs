//! Request orchestration.
//!
//! [`DataHandler`] resolves the adapter for a request, dispatches the
//! command, and stamps version metadata on the outgoing envelope. It never
//! fails: every outcome, including unrecognized database types and driver
//! errors, becomes exactly one [`DataResponse`].

use crate::database::{self, DataAdapter, DatabaseType, SUPPORTED_DATABASES};
use crate::error::AdapterError;
use crate::protocol::types::{DataCommand, DataRequest, DataResponse};
use tracing::{debug, info, instrument, warn};

/// Version reported as `handlerVersion` on every response.
pub const HANDLER_VERSION: &str = env!("CARGO_PKG_VERSION");

type AdapterFactory = dyn Fn(DatabaseType) -> Box<dyn DataAdapter> + Send + Sync;

/// External-facing request coordinator.
pub struct DataHandler {
    version: &'static str,
    factory: Box<AdapterFactory>,
}

impl DataHandler {
    pub fn new() -> Self {
        Self::with_factory(database::create_adapter)
    }

    /// Builds a handler that resolves adapters through `factory` instead of
    /// the built-in registry.
    pub fn with_factory(
        factory: impl Fn(DatabaseType) -> Box<dyn DataAdapter> + Send + Sync + 'static,
    ) -> Self {
        Self {
            version: HANDLER_VERSION,
            factory: Box::new(factory),
        }
    }

    /// Processes one request into exactly one response.
    #[instrument(skip(self, request), fields(command = %request.command, database = %request.database))]
    pub async fn process(&self, request: &DataRequest) -> DataResponse {
        match request.command() {
            DataCommand::ListSupportedAdapters => {
                debug!("listing supported adapters");
                DataResponse::adapter_list(
                    SUPPORTED_DATABASES
                        .iter()
                        .map(|database| database.as_str().to_string())
                        .collect(),
                )
            }
            command => self.dispatch(command, request).await,
        }
    }

    async fn dispatch(&self, command: DataCommand, request: &DataRequest) -> DataResponse {
        let Some(database) = DatabaseType::parse(&request.database) else {
            warn!("unknown database type: {}", request.database);
            let error = AdapterError::UnrecognizedType(request.database.clone());
            return DataResponse::error(error.to_string()).with_handler_version(self.version);
        };

        let mut adapter = (self.factory)(database);
        if let Err(error) = adapter.parse(&request.connection_string) {
            // Non-fatal: the connect attempt reports the real failure if
            // the string was unusable.
            debug!(adapter = adapter.name(), %error, "connection string not parsed");
        }

        let response = match command {
            DataCommand::TestConnection => match adapter.test().await {
                Ok(()) => {
                    info!(adapter = adapter.name(), "connection test succeeded");
                    DataResponse::ok()
                }
                Err(error) => DataResponse::error(error.to_string()),
            },
            _ => match adapter.execute(&request.query_string).await {
                Ok(result) => {
                    info!(
                        adapter = adapter.name(),
                        columns = result.count,
                        rows = result.rows.len(),
                        "query executed"
                    );
                    DataResponse::from_query_result(result)
                }
                Err(error) => DataResponse::error(error.to_string()),
            },
        };

        response.with_versions(self.version, adapter.version(), adapter.check_version())
    }
}

impl Default for DataHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::driver::{RawColumn, RawResultSet, RawValue};
    use crate::database::postgres::PostgresAdapter;
    use crate::database::traits::test_support::FakeDriver;
    use crate::error::DriverError;

    fn execute_request() -> DataRequest {
        DataRequest {
            command: "Execute".into(),
            database: "PostgreSQL".into(),
            connection_string: "pgsql:host=x;user=u;pwd=p".into(),
            query_string: "SELECT 1".into(),
        }
    }

    fn handler_with(driver: impl Fn() -> FakeDriver + Send + Sync + 'static) -> DataHandler {
        DataHandler::with_factory(move |_| Box::new(PostgresAdapter::with_driver(Box::new(driver()))))
    }

    #[tokio::test]
    async fn test_list_supported_adapters() {
        let handler = DataHandler::new();
        let request = DataRequest {
            command: "GetSupportedAdapters".into(),
            ..DataRequest::default()
        };

        let response = handler.process(&request).await;
        assert!(response.success);
        assert_eq!(
            response.types,
            Some(vec![
                "MySQL".into(),
                "MSSQL".into(),
                "Firebird".into(),
                "PostgreSQL".into(),
                "Oracle".into(),
                "ODBC".into()
            ])
        );
        // Listing bypasses adapter resolution entirely.
        assert!(response.adapter_version.is_none());
    }

    #[tokio::test]
    async fn test_execute_against_fake_driver() {
        let handler = handler_with(|| {
            FakeDriver::returning(RawResultSet {
                columns: vec![RawColumn::new("one")],
                rows: vec![vec![RawValue::Text("1".into())]],
            })
        });

        let response = handler.process(&execute_request()).await;
        let json = response.to_json();

        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["columns"], serde_json::json!(["one"]));
        assert_eq!(json["types"], serde_json::json!(["int"]));
        assert_eq!(json["rows"], serde_json::json!([[1]]));
        assert_eq!(json["handlerVersion"], HANDLER_VERSION);
        assert_eq!(json["adapterVersion"], crate::database::ADAPTER_VERSION);
        assert!(json["checkVersion"].is_boolean());
    }

    #[tokio::test]
    async fn test_unreachable_host_error_envelope() {
        let handler =
            handler_with(|| FakeDriver::failing_open(DriverError::new("08001", "host unreachable")));

        let response = handler.process(&execute_request()).await;
        let json = response.to_json();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "[08001] host unreachable");
        assert!(json.get("rows").is_none());
        // Version metadata is present even on failure.
        assert_eq!(json["handlerVersion"], HANDLER_VERSION);
        assert!(json.get("adapterVersion").is_some());
    }

    #[tokio::test]
    async fn test_test_connection_dispatch() {
        let handler = handler_with(|| FakeDriver::returning(RawResultSet::default()));
        let request = DataRequest {
            command: "TestConnection".into(),
            ..execute_request()
        };

        let response = handler.process(&request).await;
        assert!(response.success);
        assert!(response.rows.is_none());
        assert!(response.handler_version.is_some());
    }

    #[tokio::test]
    async fn test_unknown_database_type() {
        let handler = DataHandler::new();
        let request = DataRequest {
            command: "Execute".into(),
            database: "MongoDB".into(),
            ..DataRequest::default()
        };

        let response = handler.process(&request).await;
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Unknown database type [MongoDB]")
        );
        assert!(response.handler_version.is_some());
    }

    #[tokio::test]
    async fn test_unparsable_connection_string_is_non_fatal() {
        // Wrong prefix: parsing fails, the adapter keeps empty parameters,
        // and the connect step reports the user-facing error.
        let handler =
            handler_with(|| FakeDriver::failing_open(DriverError::bare("missing host")));
        let request = DataRequest {
            connection_string: "mysql:host=h".into(),
            ..execute_request()
        };

        let response = handler.process(&request).await;
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("missing host"));
    }

    #[tokio::test]
    async fn test_unknown_command_executes() {
        let handler = handler_with(|| {
            FakeDriver::returning(RawResultSet {
                columns: vec![RawColumn::new("x")],
                rows: vec![],
            })
        });
        let request = DataRequest {
            command: "RetrieveData".into(),
            ..execute_request()
        };

        let response = handler.process(&request).await;
        assert!(response.success);
        assert_eq!(response.count, Some(1));
    }
}
