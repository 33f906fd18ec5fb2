//! Request-driven database relay.
//!
//! Accepts `{command, database, connectionString, queryString}` requests,
//! opens a driver connection scoped to the request, and normalizes
//! heterogeneous result sets into one type-tagged tabular shape.
//!
//! # Example
//!
//! ```no_run
//! use dbrelay::{DataHandler, RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let handler = DataHandler::new();
//!     let server = RelayServer::new(ServerConfig::default(), handler);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod protocol;

pub use config::ServerConfig;
pub use database::{
    ConnectionInfo, DataAdapter, DatabaseType, LogicalType, QueryResult, SUPPORTED_DATABASES,
    create_adapter, resolve_adapter,
};
pub use error::{AdapterError, DriverError, RelayError, Result};
pub use handler::DataHandler;
pub use protocol::{DataRequest, DataResponse, RelayServer};
