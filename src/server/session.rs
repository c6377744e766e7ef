//! Server-side session over a newline-delimited stdio stream
//!
//! A [`ServerSession`] owns the handshake state for one connection:
//!
//! ```text
//! Uninitialized --initialize--> Ready --stdin EOF--> Closed
//! ```
//!
//! Requests are processed strictly one at a time: a frame is read, answered
//! (including any upstream call) and written before the next frame is read.
//! Per-request failures are answered with an error response and never end
//! the session; only the stream itself ending or breaking does.

use std::time::Instant;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::AnyDelimiterCodecError;

use crate::error::{MailchimpMcpError, Result};
use crate::mcp::transport::lines::{framed_with_limit, MAX_FRAME_BYTES};
use crate::mcp::types::{
    ErrorKind, ErrorObject, Implementation, InitializeParams, InitializeResponse, JsonRpcResponse,
    ServerCapabilities, LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE, METHOD_INITIALIZED,
    SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::server::audit;
use crate::server::dispatcher::Dispatcher;

/// Handshake state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for `initialize`
    Uninitialized,
    /// Handshake complete; tool traffic accepted
    Ready,
    /// The stream ended; terminal
    Closed,
}

/// One server-side protocol conversation.
#[derive(Debug)]
pub struct ServerSession {
    state: SessionState,
    dispatcher: Dispatcher,
    server_info: Implementation,
    max_frame_bytes: usize,
}

impl ServerSession {
    /// Create an uninitialized session.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            state: SessionState::Uninitialized,
            dispatcher,
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            max_frame_bytes: MAX_FRAME_BYTES,
        }
    }

    /// Override the largest accepted inbound frame.
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Serve frames from `reader`, writing responses to `writer`, until the
    /// reader reaches end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`MailchimpMcpError::TransportFailure`] when reading or writing
    /// the stream fails. End of input is a clean shutdown, not an error.
    pub async fn run<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (mut frames, mut sink) = framed_with_limit(reader, writer, self.max_frame_bytes);
        tracing::info!(tools = self.dispatcher.registry().len(), "session started");

        // After a decode error the frame stream yields `None` once before
        // resuming, which must not be taken for end of input.
        let mut resuming = false;

        loop {
            let response = match frames.next().await {
                None if resuming => {
                    resuming = false;
                    continue;
                }
                None => break,
                Some(Ok(frame)) => {
                    resuming = false;
                    self.handle_frame(&frame).await
                }
                Some(Err(AnyDelimiterCodecError::MaxChunkLengthExceeded)) => {
                    resuming = true;
                    tracing::warn!(limit = self.max_frame_bytes, "discarding oversized frame");
                    Some(JsonRpcResponse::failure(
                        Value::Null,
                        &ErrorObject::parse_error(format!(
                            "frame exceeds {} bytes",
                            self.max_frame_bytes
                        )),
                    ))
                }
                Some(Err(AnyDelimiterCodecError::Io(e))) => {
                    self.state = SessionState::Closed;
                    return Err(MailchimpMcpError::TransportFailure(format!(
                        "failed to read frame: {}",
                        e
                    ))
                    .into());
                }
            };

            if let Some(response) = response {
                let line = serde_json::to_string(&response)?;
                if let Err(e) = sink.send(line).await {
                    self.state = SessionState::Closed;
                    return Err(MailchimpMcpError::TransportFailure(format!(
                        "failed to write response: {}",
                        e
                    ))
                    .into());
                }
            }
        }

        self.state = SessionState::Closed;
        tracing::info!("input closed; session ended");
        Ok(())
    }

    /// Handle one inbound frame and return the response to write, if any.
    ///
    /// Notifications and blank lines produce no response. Bytes that are not
    /// UTF-8 JSON are answered with a parse error.
    pub async fn handle_frame(&mut self, frame: impl AsRef<[u8]>) -> Option<JsonRpcResponse> {
        let frame = frame.as_ref();
        if frame.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let value: Value = match serde_json::from_slice(frame) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("unparseable frame: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    &ErrorObject::parse_error(e),
                ));
            }
        };

        let Value::Object(message) = value else {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                &invalid_request("message must be a JSON object"),
            ));
        };

        // A present `id`, even `null`, makes this a request.
        let id = message.get("id").cloned();
        let method = message.get("method").and_then(Value::as_str);

        if let Some(version) = message.get("jsonrpc") {
            if version != "2.0" {
                return Some(JsonRpcResponse::failure(
                    id.unwrap_or(Value::Null),
                    &invalid_request("unsupported jsonrpc version"),
                ));
            }
        }

        let (Some(id), Some(method)) = (id.clone(), method) else {
            return match (id, method) {
                (None, Some(method)) => {
                    self.handle_notification(method);
                    None
                }
                (id, _) => Some(JsonRpcResponse::failure(
                    id.unwrap_or(Value::Null),
                    &invalid_request("request has no method"),
                )),
            };
        };

        let params = message.get("params").cloned();
        let started = Instant::now();
        let outcome = self.handle_request(method, params.clone()).await;
        audit::record(method, params.as_ref(), &outcome, started.elapsed());

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, &error),
        })
    }

    fn handle_notification(&self, method: &str) {
        if method == METHOD_INITIALIZED {
            tracing::debug!("client confirmed initialization");
        } else {
            tracing::debug!(method, "ignoring notification");
        }
    }

    async fn handle_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> std::result::Result<Value, ErrorObject> {
        match (self.state, method) {
            (SessionState::Uninitialized, METHOD_INITIALIZE) => {
                let response = self.initialize(params);
                self.state = SessionState::Ready;
                tracing::info!(protocol = %response.protocol_version, "session ready");
                serde_json::to_value(response).map_err(|e| {
                    ErrorObject::new(ErrorKind::ProtocolViolation, e.to_string())
                })
            }
            (SessionState::Uninitialized, other) => Err(ErrorObject::not_initialized(other)),
            (SessionState::Ready, METHOD_INITIALIZE) => {
                Err(invalid_request("session is already initialized"))
            }
            (SessionState::Ready, other) => self.dispatcher.dispatch(other, params).await,
            (SessionState::Closed, _) => Err(invalid_request("session is closed")),
        }
    }

    fn initialize(&self, params: Option<Value>) -> InitializeResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, "client connected");
        }

        let protocol_version = params
            .protocol_version
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(&v.as_str()))
            .unwrap_or_else(|| LATEST_PROTOCOL_VERSION.to_string());

        InitializeResponse {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(json!({})),
            },
            server_info: self.server_info.clone(),
        }
    }
}

fn invalid_request(message: &str) -> ErrorObject {
    ErrorObject::new(ErrorKind::ProtocolViolation, format!("Invalid request: {}", message))
}
