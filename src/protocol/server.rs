//! Relay server loop.

use crate::config::ServerConfig;
use crate::error::{ProtocolError, RelayError, Result};
use crate::handler::{DataHandler, HANDLER_VERSION};
use crate::protocol::transport::{StdioTransport, Transport};
use crate::protocol::types::{DataRequest, DataResponse};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Serves data requests over a line-oriented transport.
pub struct RelayServer {
    config: ServerConfig,
    handler: Arc<DataHandler>,
}

impl RelayServer {
    pub fn new(config: ServerConfig, handler: DataHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Runs the server over stdio.
    #[instrument(skip(self), fields(server = %self.config.name))]
    pub async fn run(self) -> Result<()> {
        let transport = Arc::new(StdioTransport::new());
        self.run_with_transport(transport).await
    }

    /// Runs the server over a custom transport.
    pub async fn run_with_transport<T: Transport + 'static>(self, transport: Arc<T>) -> Result<()> {
        info!(
            "starting relay server: {} v{}",
            self.config.name, self.config.version
        );

        loop {
            let request = match transport.read_request().await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!("EOF received, shutting down");
                    break;
                }
                Err(RelayError::Protocol(ProtocolError::Parse(message))) => {
                    // Undecodable requests map to the standard error
                    // envelope rather than ending the session.
                    let response =
                        DataResponse::error(message).with_handler_version(HANDLER_VERSION);
                    transport.write_response(&response).await?;
                    continue;
                }
                Err(e) => {
                    error!("transport error: {}", e);
                    return Err(e);
                }
            };

            let response = self.process_guarded(request).await;
            transport.write_response(&response).await?;
        }

        info!("server stopped");
        Ok(())
    }

    /// Runs the handler inside its own task so that a panic anywhere in
    /// adapter or driver code degrades to an error envelope instead of
    /// tearing down the transport loop.
    async fn process_guarded(&self, request: DataRequest) -> DataResponse {
        let handler = Arc::clone(&self.handler);
        match tokio::spawn(async move { handler.process(&request).await }).await {
            Ok(response) => response,
            Err(join_error) => {
                error!("request handling aborted: {}", join_error);
                DataResponse::error(format!("internal failure: {join_error}"))
                    .with_handler_version(HANDLER_VERSION)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Feeds a fixed request script and records every response.
    struct ScriptedTransport {
        requests: Mutex<VecDeque<Result<Option<DataRequest>>>>,
        responses: Mutex<Vec<DataResponse>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<Option<DataRequest>>>) -> Self {
            Self {
                requests: Mutex::new(script.into_iter().collect()),
                responses: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn read_request(&self) -> Result<Option<DataRequest>> {
            self.requests.lock().await.pop_front().unwrap_or(Ok(None))
        }

        async fn write_response(&self, response: &DataResponse) -> Result<()> {
            self.responses.lock().await.push(response.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_serve_list_request_until_eof() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(Some(DataRequest {
            command: "GetSupportedAdapters".into(),
            ..DataRequest::default()
        }))]));

        let server = RelayServer::new(ServerConfig::default(), DataHandler::new());
        server
            .run_with_transport(Arc::clone(&transport))
            .await
            .unwrap();

        let responses = transport.responses.lock().await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0].success);
        assert_eq!(
            responses[0].types.as_ref().map(|types| types.len()),
            Some(6)
        );
    }

    #[tokio::test]
    async fn test_decode_failure_becomes_error_envelope() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(RelayError::Protocol(ProtocolError::Parse(
                "expected value at line 1".into(),
            ))),
            Ok(Some(DataRequest {
                command: "GetSupportedAdapters".into(),
                ..DataRequest::default()
            })),
        ]));

        let server = RelayServer::new(ServerConfig::default(), DataHandler::new());
        server
            .run_with_transport(Arc::clone(&transport))
            .await
            .unwrap();

        let responses = transport.responses.lock().await;
        assert_eq!(responses.len(), 2);
        assert!(!responses[0].success);
        assert!(responses[0].message.as_deref().unwrap().contains("expected value"));
        // The session keeps serving after a bad request.
        assert!(responses[1].success);
    }
}
