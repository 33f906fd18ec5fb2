//! Stdio transport: one JSON request per line in, one envelope per line out.

use crate::error::{ProtocolError, RelayError, Result};
use crate::protocol::types::{DataRequest, DataResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::{error, trace};

/// Transport trait for relay communication.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reads the next request. `Ok(None)` means the peer closed the stream.
    async fn read_request(&self) -> Result<Option<DataRequest>>;

    async fn write_response(&self, response: &DataResponse) -> Result<()>;
}

/// Stdio-based line transport.
pub struct StdioTransport {
    reader: Arc<Mutex<BufReader<Stdin>>>,
    writer: Arc<Mutex<Stdout>>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()))),
            writer: Arc::new(Mutex::new(tokio::io::stdout())),
        }
    }

    /// Reads the next non-blank line; `None` at EOF.
    async fn read_line(&self) -> Result<Option<String>> {
        let mut reader = self.reader.lock().await;
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        trace!("received line: {}", line);
                        return Ok(Some(line.to_string()));
                    }
                }
                Err(e) => {
                    error!("error reading from stdin: {}", e);
                    return Err(RelayError::Io(e));
                }
            }
        }
    }

    async fn write_line(&self, content: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        trace!("sending line: {}", content);
        writer.write_all(content.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn read_request(&self) -> Result<Option<DataRequest>> {
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };

        match serde_json::from_str::<DataRequest>(&line) {
            Ok(request) => Ok(Some(request)),
            Err(e) => Err(RelayError::Protocol(ProtocolError::Parse(e.to_string()))),
        }
    }

    async fn write_response(&self, response: &DataResponse) -> Result<()> {
        let json = serde_json::to_string(response)?;
        self.write_line(&json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::DataCommand;

    #[test]
    fn test_request_line_parsing() {
        let json = r#"{"command":"TestConnection","database":"MySQL","connectionString":"mysql:host=h;uid=u"}"#;
        let request: DataRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.command(), DataCommand::TestConnection);
        assert_eq!(request.database, "MySQL");
    }

    #[test]
    fn test_response_line_shape() {
        let response = DataResponse::error("boom");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"boom"}"#);
    }
}
