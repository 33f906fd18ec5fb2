//! MSSQL adapter, with a native driver built on `tiberius`.

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Driver, RawColumn};
#[cfg(not(feature = "mssql"))]
use crate::database::driver::UnavailableDriver;
use crate::database::traits::DataAdapter;
use crate::database::types::LogicalType;

/// Microsoft SQL Server data adapter. Parses `sqlsrv:`-prefixed connection
/// strings.
pub struct MssqlAdapter {
    info: ConnectionInfo,
    driver: Box<dyn Driver>,
}

impl MssqlAdapter {
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

impl Default for MssqlAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAdapter for MssqlAdapter {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn dsn_prefix(&self) -> &'static str {
        "sqlsrv"
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
            Some(type_name) => mssql_logical_type(type_name),
            None => LogicalType::String,
        }
    }
}

/// Maps a TDS column type name (the `Debug` rendering of tiberius's
/// `ColumnType`) to a logical type.
fn mssql_logical_type(type_name: &str) -> LogicalType {
    match type_name.to_lowercase().as_str() {
        "int1" | "int2" | "int4" | "int8" | "intn" => LogicalType::Int,
        "float4" | "float8" | "floatn" | "money" | "money4" | "decimaln" | "numericn" => {
            LogicalType::Number
        }
        "datetime" | "datetime2" | "datetime4" | "datetimen" | "daten" | "timen"
        | "datetimeoffsetn" => LogicalType::Datetime,
        "bigbinary" | "bigvarbin" | "image" => LogicalType::Array,
        _ => LogicalType::String,
    }
}

#[cfg(feature = "mssql")]
fn native_driver() -> Box<dyn Driver> {
    Box::new(native::MssqlDriver)
}

#[cfg(not(feature = "mssql"))]
fn native_driver() -> Box<dyn Driver> {
    Box::new(UnavailableDriver::new("mssql"))
}

#[cfg(feature = "mssql")]
mod native {
    use crate::database::connection_string::ConnectionInfo;
    use crate::database::driver::{Connection, Driver, RawColumn, RawResultSet, RawValue};
    use crate::error::{DriverError, DriverResult};
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use rust_decimal::Decimal;
    use tiberius::{AuthMethod, Client, Config, Row};
    use tokio::net::TcpStream;
    use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

    pub(super) struct MssqlDriver;

    #[async_trait]
    impl Driver for MssqlDriver {
        async fn open(&self, info: &ConnectionInfo) -> DriverResult<Box<dyn Connection>> {
            let mut config = Config::new();

            // ADO-style `Server=host,port` is accepted alongside separate
            // host/port options.
            let server = info
                .param(&["server", "host", "data source", "address"])
                .unwrap_or_else(|| "localhost".to_string());
            let (host, inline_port) = match server.split_once(',') {
                Some((host, port)) => (host.trim().to_string(), port.trim().parse::<u16>().ok()),
                None => (server, None),
            };
            config.host(&host);
            if let Some(port) = inline_port {
                config.port(port);
            } else if let Some(port) = info.param(&["port"]) {
                let port: u16 = port
                    .parse()
                    .map_err(|_| DriverError::bare(format!("invalid port: {port}")))?;
                config.port(port);
            }
            if let Some(database) = info.param(&["database", "dbname", "initial catalog"]) {
                config.database(database);
            }
            config.authentication(AuthMethod::sql_server(&info.user_id, &info.password));
            config.trust_cert();

            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|error| DriverError::bare(error.to_string()))?;
            tcp.set_nodelay(true)
                .map_err(|error| DriverError::bare(error.to_string()))?;

            let client = Client::connect(config, tcp.compat_write())
                .await
                .map_err(ms_error)?;

            Ok(Box::new(MssqlConnection {
                client: Some(client),
            }))
        }
    }

    struct MssqlConnection {
        client: Option<Client<Compat<TcpStream>>>,
    }

    #[async_trait]
    impl Connection for MssqlConnection {
        async fn query(&mut self, sql: &str) -> DriverResult<RawResultSet> {
            let client = self
                .client
                .as_mut()
                .ok_or_else(|| DriverError::bare("connection already closed"))?;

            let mut stream = client.simple_query(sql).await.map_err(ms_error)?;
            let columns: Vec<RawColumn> = stream
                .columns()
                .await
                .map_err(ms_error)?
                .map(|columns| {
                    columns
                        .iter()
                        .map(|column| {
                            RawColumn::with_type(
                                column.name(),
                                format!("{:?}", column.column_type()),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();

            let results = stream.into_results().await.map_err(ms_error)?;
            let rows = results
                .into_iter()
                .next()
                .unwrap_or_default()
                .iter()
                .map(|row| row_to_raw(row, columns.len()))
                .collect();

            Ok(RawResultSet { columns, rows })
        }

        async fn close(&mut self) {
            if let Some(client) = self.client.take() {
                let _ = client.close().await;
            }
        }
    }

    fn ms_error(error: tiberius::error::Error) -> DriverError {
        match error {
            tiberius::error::Error::Server(token) => {
                DriverError::new(token.code().to_string(), token.message().to_string())
            }
            other => DriverError::bare(other.to_string()),
        }
    }

    fn row_to_raw(row: &Row, column_count: usize) -> Vec<RawValue> {
        (0..column_count).map(|index| cell_value(row, index)).collect()
    }

    /// Renders one cell textually, trying types from most to least specific.
    fn cell_value(row: &Row, index: usize) -> RawValue {
        if let Ok(Some(value)) = row.try_get::<i32, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<i64, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<i16, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<u8, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<f64, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<f32, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<bool, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<Decimal, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<&str, _>(index) {
            return RawValue::Text(value.to_string());
        }
        if let Ok(Some(value)) = row.try_get::<NaiveDateTime, _>(index) {
            return RawValue::Text(value.format("%Y-%m-%d %H:%M:%S").to_string());
        }
        if let Ok(Some(value)) = row.try_get::<DateTime<Utc>, _>(index) {
            return RawValue::Text(value.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string());
        }
        if let Ok(Some(value)) = row.try_get::<NaiveDate, _>(index) {
            return RawValue::Text(value.format("%Y-%m-%d").to_string());
        }
        if let Ok(Some(value)) = row.try_get::<NaiveTime, _>(index) {
            return RawValue::Text(value.format("%H:%M:%S").to_string());
        }
        if let Ok(Some(value)) = row.try_get::<&[u8], _>(index) {
            return RawValue::Blob(value.to_vec());
        }
        RawValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_type_mapping() {
        assert_eq!(mssql_logical_type("Int4"), LogicalType::Int);
        assert_eq!(mssql_logical_type("Intn"), LogicalType::Int);
        assert_eq!(mssql_logical_type("Decimaln"), LogicalType::Number);
        assert_eq!(mssql_logical_type("Datetime2"), LogicalType::Datetime);
        assert_eq!(mssql_logical_type("BigVarBin"), LogicalType::Array);
        assert_eq!(mssql_logical_type("NVarchar"), LogicalType::String);
    }

    #[test]
    fn test_adapter_identity() {
        let adapter = MssqlAdapter::new();
        assert_eq!(adapter.name(), "mssql");
        assert_eq!(adapter.dsn_prefix(), "sqlsrv");
    }
}
