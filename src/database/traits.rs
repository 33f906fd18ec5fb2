//! Data adapter trait.
//!
//! One implementation per database family. The shared lifecycle — scoped
//! connect/release around `test` and `execute`, strategy-based result
//! normalization — lives in default methods; concrete adapters supply
//! identity, a wire driver, and optional metadata-mapping/coercion
//! overrides.
//!
//! Implementations: [`MySqlAdapter`](crate::database::MySqlAdapter),
//! [`MssqlAdapter`](crate::database::MssqlAdapter),
//! [`FirebirdAdapter`](crate::database::FirebirdAdapter),
//! [`PostgresAdapter`](crate::database::PostgresAdapter),
//! [`OracleAdapter`](crate::database::OracleAdapter),
//! [`OdbcAdapter`](crate::database::OdbcAdapter).

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Connection, Driver, RawColumn, RawValue};
use crate::database::result::{CellValue, QueryResult};
use crate::database::strategy::{self, ExecutionStrategy};
use crate::database::types::LogicalType;
use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use tracing::debug;

/// Version reported by every built-in adapter.
pub const ADAPTER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Async database adapter trait.
#[async_trait]
pub trait DataAdapter: Send + Sync {
    /// Returns the family name (e.g., "mysql", "postgres").
    fn name(&self) -> &'static str;

    /// DSN prefix the connection-string parser keys on (e.g., "pgsql").
    fn dsn_prefix(&self) -> &'static str;

    fn version(&self) -> &'static str {
        ADAPTER_VERSION
    }

    /// Whether clients should verify handler/adapter version compatibility.
    fn check_version(&self) -> bool {
        true
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::MetadataFirst
    }

    fn driver(&self) -> &dyn Driver;

    fn connection_info(&self) -> &ConnectionInfo;

    fn set_connection_info(&mut self, info: ConnectionInfo);

    /// Parses `raw` into this adapter's connection parameters.
    ///
    /// Parameters are rebuilt from scratch on every call; a failed parse
    /// leaves the adapter with defaults, and the next connect attempt
    /// reports the user-facing error.
    fn parse(&mut self, raw: &str) -> AdapterResult<()> {
        self.set_connection_info(ConnectionInfo::default());
        let info = ConnectionInfo::parse(raw, self.dsn_prefix())?;
        self.set_connection_info(info);
        Ok(())
    }

    /// Maps driver column metadata to a logical type.
    ///
    /// Baseline: every driver-reported type reads as `string`. Families
    /// with trustworthy metadata override this.
    fn parse_column_type(&self, _column: &RawColumn) -> LogicalType {
        LogicalType::String
    }

    /// Converts one raw cell to the column's resolved logical type.
    fn coerce(&self, logical: LogicalType, raw: RawValue) -> CellValue {
        strategy::default_coerce(logical, raw)
    }

    /// Opens a connection using the parsed parameters.
    async fn connect(&self) -> AdapterResult<Box<dyn Connection>> {
        self.driver()
            .open(self.connection_info())
            .await
            .map_err(AdapterError::ConnectionFailed)
    }

    /// Scoped connection check: connect and, if that succeeded, release
    /// immediately. Reports the connect outcome; release failures never
    /// surface.
    async fn test(&self) -> AdapterResult<()> {
        let mut connection = self.connect().await?;
        connection.close().await;
        Ok(())
    }

    /// Executes `query` within a scoped connection and normalizes the
    /// result set per this adapter's strategy.
    ///
    /// The connection is released on every exit path after a successful
    /// connect, including query failure.
    async fn execute(&self, query: &str) -> AdapterResult<QueryResult> {
        let mut connection = self.connect().await?;
        let outcome = connection.query(query).await;
        connection.close().await;

        let raw = outcome.map_err(AdapterError::QueryFailed)?;
        debug!(
            adapter = self.name(),
            columns = raw.columns.len(),
            rows = raw.rows.len(),
            "normalizing result set"
        );
        Ok(strategy::normalize(
            self.strategy(),
            raw,
            &|column| self.parse_column_type(column),
            &|logical, value| self.coerce(logical, value),
        ))
    }
}
