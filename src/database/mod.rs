//! Database adapter layer.
//!
//! Provides a unified adapter interface over heterogeneous database
//! backends (MySQL, MSSQL, Firebird, PostgreSQL, Oracle, ODBC).
//!
//! # Feature Flags
//!
//! - `mysql` - native MySQL wire driver via `mysql_async` (enabled by default)
//! - `mssql` - native Microsoft SQL Server wire driver via `tiberius` (enabled by default)
//! - `postgres` - native PostgreSQL wire driver via `tokio-postgres` (enabled by default)
//!
//! Adapters for families without a compiled-in wire driver still parse
//! connection strings and accept injected drivers; their default connect
//! attempt fails like a PDO installation missing the matching extension.

pub mod connection_string;
pub mod driver;
pub mod firebird;
pub mod mssql;
pub mod mysql;
pub mod odbc;
pub mod oracle;
pub mod postgres;
pub mod result;
pub mod strategy;
pub mod traits;
pub mod types;

pub use connection_string::ConnectionInfo;
pub use driver::{Connection, Driver, RawColumn, RawResultSet, RawValue, UnavailableDriver};
pub use firebird::FirebirdAdapter;
pub use mssql::MssqlAdapter;
pub use mysql::MySqlAdapter;
pub use odbc::OdbcAdapter;
pub use oracle::OracleAdapter;
pub use postgres::PostgresAdapter;
pub use result::{CellValue, QueryResult};
pub use strategy::ExecutionStrategy;
pub use traits::{ADAPTER_VERSION, DataAdapter};
pub use types::LogicalType;

use crate::error::AdapterError;
use std::fmt;

/// Database family enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    MySql,
    Mssql,
    Firebird,
    PostgreSql,
    Oracle,
    Odbc,
}

impl DatabaseType {
    /// Parses a database type from a string.
    ///
    /// Accepts various common aliases for each family. Unknown names are
    /// rejected, never defaulted to any driver.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Some(Self::MySql),
            "mssql" | "ms sql" | "sqlserver" | "sql_server" => Some(Self::Mssql),
            "firebird" => Some(Self::Firebird),
            "postgresql" | "postgres" | "pgsql" | "pg" => Some(Self::PostgreSql),
            "oracle" | "oci" => Some(Self::Oracle),
            "odbc" => Some(Self::Odbc),
            _ => None,
        }
    }

    /// Canonical identifier reported to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Mssql => "MSSQL",
            Self::Firebird => "Firebird",
            Self::PostgreSql => "PostgreSQL",
            Self::Oracle => "Oracle",
            Self::Odbc => "ODBC",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported database families, in the order they are reported to clients.
/// Extend together with the match in [`create_adapter`].
pub const SUPPORTED_DATABASES: [DatabaseType; 6] = [
    DatabaseType::MySql,
    DatabaseType::Mssql,
    DatabaseType::Firebird,
    DatabaseType::PostgreSql,
    DatabaseType::Oracle,
    DatabaseType::Odbc,
];

/// Creates the data adapter for a database family.
pub fn create_adapter(database: DatabaseType) -> Box<dyn DataAdapter> {
    match database {
        DatabaseType::MySql => Box::new(MySqlAdapter::new()),
        DatabaseType::Mssql => Box::new(MssqlAdapter::new()),
        DatabaseType::Firebird => Box::new(FirebirdAdapter::new()),
        DatabaseType::PostgreSql => Box::new(PostgresAdapter::new()),
        DatabaseType::Oracle => Box::new(OracleAdapter::new()),
        DatabaseType::Odbc => Box::new(OdbcAdapter::new()),
    }
}

/// Resolves a client-supplied database name to its adapter.
///
/// # Errors
///
/// Returns [`AdapterError::UnrecognizedType`] carrying the offending name
/// when it matches no known family.
pub fn resolve_adapter(name: &str) -> Result<Box<dyn DataAdapter>, AdapterError> {
    DatabaseType::parse(name)
        .map(create_adapter)
        .ok_or_else(|| AdapterError::UnrecognizedType(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_parse() {
        assert_eq!(DatabaseType::parse("MySQL"), Some(DatabaseType::MySql));
        assert_eq!(DatabaseType::parse("MS SQL"), Some(DatabaseType::Mssql));
        assert_eq!(
            DatabaseType::parse("postgresql"),
            Some(DatabaseType::PostgreSql)
        );
        assert_eq!(DatabaseType::parse("oci"), Some(DatabaseType::Oracle));
        assert_eq!(DatabaseType::parse("unknown"), None);
    }

    #[test]
    fn test_registry_matches_factory() {
        for database in SUPPORTED_DATABASES {
            let adapter = create_adapter(database);
            assert_eq!(
                DatabaseType::parse(adapter.name()),
                Some(database),
                "adapter name {} does not round-trip",
                adapter.name()
            );
        }
    }

    #[test]
    fn test_registry_identifiers() {
        let names: Vec<&str> = SUPPORTED_DATABASES.iter().map(|d| d.as_str()).collect();
        assert_eq!(
            names,
            vec!["MySQL", "MSSQL", "Firebird", "PostgreSQL", "Oracle", "ODBC"]
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = resolve_adapter("MongoDB").err().unwrap();
        assert_eq!(err.to_string(), "Unknown database type [MongoDB]");
        assert!(matches!(err, AdapterError::UnrecognizedType(_)));
    }
}
