//! Wire protocol: request/response types, transports, and the serve loop.

pub mod server;
pub mod transport;
pub mod types;

pub use server::RelayServer;
pub use transport::{StdioTransport, Transport};
pub use types::{DataCommand, DataRequest, DataResponse};
