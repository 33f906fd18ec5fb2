//! MySQL adapter, with a native driver built on `mysql_async`.

use crate::database::connection_string::ConnectionInfo;
use crate::database::driver::{Driver, RawColumn};
#[cfg(not(feature = "mysql"))]
use crate::database::driver::UnavailableDriver;
use crate::database::traits::DataAdapter;
use crate::database::types::LogicalType;

/// MySQL data adapter. Parses `mysql:`-prefixed connection strings.
pub struct MySqlAdapter {
    info: ConnectionInfo,
    driver: Box<dyn Driver>,
}

impl MySqlAdapter {
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

impl Default for MySqlAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataAdapter for MySqlAdapter {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn dsn_prefix(&self) -> &'static str {
        "mysql"
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
            Some(type_name) => mysql_logical_type(type_name),
            None => LogicalType::String,
        }
    }
}

/// Maps a MySQL protocol column type name (the `Debug` rendering of
/// `ColumnType`, e.g. `MYSQL_TYPE_LONG`) to a logical type.
fn mysql_logical_type(type_name: &str) -> LogicalType {
    let name = type_name.to_lowercase();
    let name = name.strip_prefix("mysql_type_").unwrap_or(&name);
    match name {
        "tiny" | "short" | "long" | "longlong" | "int24" | "year" | "bit" => LogicalType::Int,
        "decimal" | "newdecimal" | "float" | "double" => LogicalType::Number,
        "timestamp" | "date" | "time" | "datetime" | "newdate" | "timestamp2" | "datetime2"
        | "time2" => LogicalType::Datetime,
        "tiny_blob" | "medium_blob" | "long_blob" | "blob" | "geometry" => LogicalType::Array,
        _ => LogicalType::String,
    }
}

#[cfg(feature = "mysql")]
fn native_driver() -> Box<dyn Driver> {
    Box::new(native::MySqlDriver)
}

#[cfg(not(feature = "mysql"))]
fn native_driver() -> Box<dyn Driver> {
    Box::new(UnavailableDriver::new("mysql"))
}

#[cfg(feature = "mysql")]
mod native {
    use crate::database::connection_string::ConnectionInfo;
    use crate::database::driver::{Connection, Driver, RawColumn, RawResultSet, RawValue};
    use crate::error::{DriverError, DriverResult};
    use async_trait::async_trait;
    use mysql_async::prelude::Queryable;
    use mysql_async::{Conn, Opts, OptsBuilder, Value};

    pub(super) struct MySqlDriver;

    #[async_trait]
    impl Driver for MySqlDriver {
        async fn open(&self, info: &ConnectionInfo) -> DriverResult<Box<dyn Connection>> {
            let mut builder = OptsBuilder::default().ip_or_hostname(
                info.param(&["host", "server"])
                    .unwrap_or_else(|| "localhost".to_string()),
            );
            if let Some(port) = info.param(&["port"]) {
                let port: u16 = port
                    .parse()
                    .map_err(|_| DriverError::bare(format!("invalid port: {port}")))?;
                builder = builder.tcp_port(port);
            }
            builder = builder.db_name(info.param(&["dbname", "database"]));
            if !info.user_id.is_empty() {
                builder = builder.user(Some(info.user_id.clone()));
            }
            if !info.password.is_empty() {
                builder = builder.pass(Some(info.password.clone()));
            }

            let conn = Conn::new(Opts::from(builder)).await.map_err(my_error)?;
            Ok(Box::new(MySqlConnection { conn: Some(conn) }))
        }
    }

    struct MySqlConnection {
        conn: Option<Conn>,
    }

    #[async_trait]
    impl Connection for MySqlConnection {
        async fn query(&mut self, sql: &str) -> DriverResult<RawResultSet> {
            let conn = self
                .conn
                .as_mut()
                .ok_or_else(|| DriverError::bare("connection already closed"))?;

            let mut result = conn.query_iter(sql).await.map_err(my_error)?;
            let columns: Vec<RawColumn> = result
                .columns()
                .map(|columns| {
                    columns
                        .iter()
                        .map(|column| {
                            RawColumn::with_type(
                                column.name_str().into_owned(),
                                format!("{:?}", column.column_type()),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();

            let mysql_rows: Vec<mysql_async::Row> =
                result.collect().await.map_err(my_error)?;
            let rows = mysql_rows
                .into_iter()
                .map(|row| row.unwrap().into_iter().map(raw_value).collect())
                .collect();

            Ok(RawResultSet { columns, rows })
        }

        async fn close(&mut self) {
            if let Some(conn) = self.conn.take() {
                let _ = conn.disconnect().await;
            }
        }
    }

    fn my_error(error: mysql_async::Error) -> DriverError {
        match error {
            mysql_async::Error::Server(server) => {
                DriverError::new(server.code.to_string(), server.message)
            }
            other => DriverError::bare(other.to_string()),
        }
    }

    fn raw_value(value: Value) -> RawValue {
        match value {
            Value::NULL => RawValue::Null,
            Value::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => RawValue::Text(text),
                Err(error) => RawValue::Blob(error.into_bytes()),
            },
            Value::Int(value) => RawValue::Text(value.to_string()),
            Value::UInt(value) => RawValue::Text(value.to_string()),
            Value::Float(value) => RawValue::Text(value.to_string()),
            Value::Double(value) => RawValue::Text(value.to_string()),
            Value::Date(year, month, day, hour, minute, second, _micros) => {
                if hour == 0 && minute == 0 && second == 0 {
                    RawValue::Text(format!("{year:04}-{month:02}-{day:02}"))
                } else {
                    RawValue::Text(format!(
                        "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                    ))
                }
            }
            Value::Time(negative, days, hours, minutes, seconds, _micros) => {
                let sign = if negative { "-" } else { "" };
                let hours = days * 24 + u32::from(hours);
                RawValue::Text(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_type_mapping() {
        assert_eq!(mysql_logical_type("MYSQL_TYPE_LONG"), LogicalType::Int);
        assert_eq!(mysql_logical_type("MYSQL_TYPE_LONGLONG"), LogicalType::Int);
        assert_eq!(
            mysql_logical_type("MYSQL_TYPE_NEWDECIMAL"),
            LogicalType::Number
        );
        assert_eq!(
            mysql_logical_type("MYSQL_TYPE_DATETIME"),
            LogicalType::Datetime
        );
        assert_eq!(
            mysql_logical_type("MYSQL_TYPE_LONG_BLOB"),
            LogicalType::Array
        );
        assert_eq!(
            mysql_logical_type("MYSQL_TYPE_VAR_STRING"),
            LogicalType::String
        );
    }

    #[test]
    fn test_adapter_identity() {
        let adapter = MySqlAdapter::new();
        assert_eq!(adapter.name(), "mysql");
        assert_eq!(adapter.dsn_prefix(), "mysql");
    }
}
