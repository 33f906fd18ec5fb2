//! PostgreSQL adapter, with a native driver built on `tokio-postgres`.

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Driver, RawColumn};
#[cfg(not(feature = "postgres"))]
use crate::database::driver::UnavailableDriver;
use crate::database::traits::DataAdapter;
use crate::database::types::LogicalType;

/// PostgreSQL data adapter. Parses `pgsql:`-prefixed connection strings.
pub struct PostgresAdapter {
    info: ConnectionInfo,
    driver: Box<dyn Driver>,
}

impl PostgresAdapter {
    pub fn new() -> Self {
        Self::with_driver(native_driver())
    }

    /// Builds the adapter around a caller-supplied wire driver.
    pub fn with_driver(driver: Box<dyn Driver>) -> Self {
        Self {
            info: ConnectionInfo::default(),
            driver,
        }
    }
}

impl Default for PostgresAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAdapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn dsn_prefix(&self) -> &'static str {
        "pgsql"
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

    fn parse_column_type(&self, column: &RawColumn) -> LogicalType {
        match column.type_name.as_deref() {
            Some(type_name) => pg_logical_type(type_name),
            None => LogicalType::String,
        }
    }
}

fn pg_logical_type(type_name: &str) -> LogicalType {
    match type_name.to_lowercase().as_str() {
        "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" | "oid" => LogicalType::Int,
        "float4" | "float8" | "real" | "double precision" | "numeric" | "decimal" | "money" => {
            LogicalType::Number
        }
        "date" | "time" | "timetz" | "timestamp" | "timestamptz" => LogicalType::Datetime,
        "bytea" => LogicalType::Array,
        _ => LogicalType::String,
    }
}

#[cfg(feature = "postgres")]
fn native_driver() -> Box<dyn Driver> {
    Box::new(native::PostgresDriver)
}

#[cfg(not(feature = "postgres"))]
fn native_driver() -> Box<dyn Driver> {
    Box::new(UnavailableDriver::new("postgres"))
}

#[cfg(feature = "postgres")]
mod native {
    use crate::database::connection_string::ConnectionInfo;
    use crate::database::driver::{Connection, Driver, RawColumn, RawResultSet, RawValue};
    use crate::error::{DriverError, DriverResult};
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use rust_decimal::Decimal;
    use tokio_postgres::{Client, Config, NoTls, Row};
    use tracing::debug;

    pub(super) struct PostgresDriver;

    #[async_trait]
    impl Driver for PostgresDriver {
        async fn open(&self, info: &ConnectionInfo) -> DriverResult<Box<dyn Connection>> {
            let mut config = Config::new();
            let host = info
                .param(&["host", "server"])
                .unwrap_or_else(|| "localhost".to_string());
            config.host(&host);
            if let Some(port) = info.param(&["port"]) {
                let port: u16 = port
                    .parse()
                    .map_err(|_| DriverError::bare(format!("invalid port: {port}")))?;
                config.port(port);
            }
            if let Some(dbname) = info.param(&["dbname", "database"]) {
                config.dbname(&dbname);
            }
            if !info.user_id.is_empty() {
                config.user(&info.user_id);
            }
            if !info.password.is_empty() {
                config.password(&info.password);
            }

            let (client, connection) = config.connect(NoTls).await.map_err(pg_error)?;
            let task = tokio::spawn(async move {
                if let Err(error) = connection.await {
                    debug!("postgres connection task ended: {error}");
                }
            });

            Ok(Box::new(PostgresConnection { client, task }))
        }
    }

    struct PostgresConnection {
        client: Client,
        task: tokio::task::JoinHandle<()>,
    }

    #[async_trait]
    impl Connection for PostgresConnection {
        async fn query(&mut self, sql: &str) -> DriverResult<RawResultSet> {
            let statement = self.client.prepare(sql).await.map_err(pg_error)?;
            let rows = self.client.query(&statement, &[]).await.map_err(pg_error)?;

            let columns = statement
                .columns()
                .iter()
                .map(|column| RawColumn::with_type(column.name(), column.type_().name()))
                .collect();
            let rows = rows.iter().map(row_to_raw).collect();

            Ok(RawResultSet { columns, rows })
        }

        async fn close(&mut self) {
            self.task.abort();
        }
    }

    fn pg_error(error: tokio_postgres::Error) -> DriverError {
        match error.as_db_error() {
            Some(db_error) => DriverError::new(db_error.code().code(), db_error.message()),
            None => DriverError::bare(error.to_string()),
        }
    }

    fn row_to_raw(row: &Row) -> Vec<RawValue> {
        (0..row.columns().len())
            .map(|index| cell_value(row, index))
            .collect()
    }

    /// Renders one cell textually, trying types from most to least specific.
    fn cell_value(row: &Row, index: usize) -> RawValue {
        if let Ok(value) = row.try_get::<_, Option<i64>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<i32>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<i16>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<f64>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<f32>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<Decimal>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<bool>>(index) {
            return text_or_null(value.map(|v| v.to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<String>>(index) {
            return text_or_null(value);
        }
        if let Ok(value) = row.try_get::<_, Option<NaiveDateTime>>(index) {
            return text_or_null(value.map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<DateTime<Utc>>>(index) {
            return text_or_null(
                value.map(|v| v.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()),
            );
        }
        if let Ok(value) = row.try_get::<_, Option<NaiveDate>>(index) {
            return text_or_null(value.map(|v| v.format("%Y-%m-%d").to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<NaiveTime>>(index) {
            return text_or_null(value.map(|v| v.format("%H:%M:%S").to_string()));
        }
        if let Ok(value) = row.try_get::<_, Option<Vec<u8>>>(index) {
            return match value {
                Some(bytes) => RawValue::Blob(bytes),
                None => RawValue::Null,
            };
        }
        debug!(
            column = row.columns()[index].name(),
            pg_type = row.columns()[index].type_().name(),
            "unsupported postgres type, reading as NULL"
        );
        RawValue::Null
    }

    fn text_or_null(value: Option<String>) -> RawValue {
        match value {
            Some(text) => RawValue::Text(text),
            None => RawValue::Null,
        }
    }
}
