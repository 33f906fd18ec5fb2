//! Wire-driver seam.
//!
//! Adapters talk to concrete backends through these traits, so the
//! normalization pipeline stays identical across database families and can
//! be exercised against in-memory fakes.

use crate::database::connection_string::ConnectionInfo;
use crate::error::{DriverError, DriverResult};
use async_trait::async_trait;

/// Column metadata as reported by a driver.
///
/// `type_name` is `None` when the backend exposes no reliable type
/// information for the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    pub type_name: Option<String>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }

    pub fn with_type(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }
}

/// Cell value as delivered by a driver: textual, binary, or SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Null,
    Text(String),
    Blob(Vec<u8>),
}

/// Fully fetched result set in driver-native form.
#[derive(Debug, Clone, Default)]
pub struct RawResultSet {
    pub columns: Vec<RawColumn>,
    pub rows: Vec<Vec<RawValue>>,
}

/// Opens connections for one database family.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn open(&self, info: &ConnectionInfo) -> DriverResult<Box<dyn Connection>>;
}

/// An open driver connection.
#[async_trait]
pub trait Connection: Send {
    async fn query(&mut self, sql: &str) -> DriverResult<RawResultSet>;

    /// Releases the underlying handle. Best effort; never reports failure.
    async fn close(&mut self) {}
}

/// Stand-in for families whose wire transport is not compiled into this
/// build. The failure surfaces at connect time, like a PDO installation
/// that is missing the extension for the requested driver.
pub struct UnavailableDriver {
    family: &'static str,
}

impl UnavailableDriver {
    pub fn new(family: &'static str) -> Self {
        Self { family }
    }
}

#[async_trait]
impl Driver for UnavailableDriver {
    async fn open(&self, _info: &ConnectionInfo) -> DriverResult<Box<dyn Connection>> {
        Err(DriverError::bare(format!(
            "could not find driver: {} support is not compiled into this build",
            self.family
        )))
    }
}
