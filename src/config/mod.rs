//! Server configuration.

use std::borrow::Cow;

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: Cow<'static, str>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
            log_filter: concat!(env!("CARGO_CRATE_NAME"), "=info,warn").into(),
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn log_filter(mut self, filter: impl Into<Cow<'static, str>>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
