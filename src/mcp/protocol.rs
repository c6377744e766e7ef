//! Typed client session lifecycle over [`JsonRpcClient`]
//!
//! A client session moves through two types:
//!
//! - [`McpProtocol`] -- connected but not yet initialized. The only operation
//!   is [`McpProtocol::initialize`], which performs the `initialize` /
//!   `notifications/initialized` handshake.
//! - [`InitializedMcpProtocol`] -- a ready session. Tool traffic
//!   (`tools/list`, `tools/call`) is only expressible on this type, so a client
//!   cannot issue it before the handshake. [`InitializedMcpProtocol::close`]
//!   consumes the session.
//!
//! Requests on a ready session are serialized: each waits for its matching
//! response before the next one is written.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Map, Value};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{MailchimpMcpError, Result};
use crate::mcp::client::{start_read_loop, JsonRpcClient};
use crate::mcp::transport::Transport;
use crate::mcp::types::{
    CallToolParams, ClientCapabilities, Implementation, InitializeParams, InitializeResponse,
    ListToolsResponse, ToolDescriptor, LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE,
    METHOD_INITIALIZED, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, SUPPORTED_PROTOCOL_VERSIONS,
};

/// Background plumbing between a [`Transport`] and a [`JsonRpcClient`].
#[derive(Debug)]
struct Connection {
    cancellation: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Connection {
    fn open(transport: Arc<dyn Transport>) -> (Self, Arc<JsonRpcClient>) {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();
        let cancellation = CancellationToken::new();
        let client = Arc::new(JsonRpcClient::new(out_tx));

        let writer = {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move {
                while let Some(message) = out_rx.recv().await {
                    if let Err(e) = transport.send(message).await {
                        tracing::warn!("failed to write to server: {e}");
                        break;
                    }
                }
            })
        };

        let reader = tokio::spawn(async move {
            let mut frames = transport.receive();
            while let Some(frame) = frames.next().await {
                if in_tx.send(frame).is_err() {
                    break;
                }
            }
            tracing::debug!("server transport closed");
        });

        let read_loop = start_read_loop(in_rx, cancellation.clone(), Arc::clone(&client));

        (
            Self {
                cancellation,
                tasks: vec![writer, reader, read_loop],
            },
            client,
        )
    }

    fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancellation.cancel();
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// A connected client session that has not completed the handshake.
///
/// # Examples
///
/// ```no_run
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use std::time::Duration;
/// use mailchimp_mcp::mcp::protocol::McpProtocol;
/// use mailchimp_mcp::mcp::transport::stdio::StdioTransport;
/// use mailchimp_mcp::mcp::types::Implementation;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let transport = StdioTransport::spawn(
///         "mailchimp-mcp".into(),
///         vec!["serve".into()],
///         HashMap::new(),
///         None,
///     )?;
///     let session = McpProtocol::connect(Arc::new(transport), Duration::from_secs(30))
///         .initialize(Implementation { name: "demo".into(), version: "0.1.0".into() })
///         .await?;
///     let tools = session.list_tools().await?;
///     println!("{} tools", tools.len());
///     session.close();
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct McpProtocol {
    client: Arc<JsonRpcClient>,
    connection: Connection,
    timeout: Duration,
}

impl McpProtocol {
    /// Wire `transport` to a fresh JSON-RPC client.
    ///
    /// `timeout` bounds every request issued on this session.
    pub fn connect(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        let (connection, client) = Connection::open(transport);
        Self {
            client,
            connection,
            timeout,
        }
    }

    /// Perform the handshake and return a ready session.
    ///
    /// # Errors
    ///
    /// Returns [`MailchimpMcpError::ProtocolVersion`] if the server selects a
    /// protocol version outside [`SUPPORTED_PROTOCOL_VERSIONS`], or any error
    /// from the underlying request (timeout, transport failure, remote error).
    pub async fn initialize(self, client_info: Implementation) -> Result<InitializedMcpProtocol> {
        let response: InitializeResponse = match self
            .client
            .request(
                METHOD_INITIALIZE,
                InitializeParams {
                    protocol_version: Some(LATEST_PROTOCOL_VERSION.to_string()),
                    capabilities: ClientCapabilities::default(),
                    client_info: Some(client_info),
                },
                self.timeout,
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.connection.shutdown();
                return Err(e);
            }
        };

        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&response.protocol_version.as_str()) {
            self.connection.shutdown();
            return Err(MailchimpMcpError::ProtocolVersion {
                expected: SUPPORTED_PROTOCOL_VERSIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                got: response.protocol_version,
            }
            .into());
        }

        self.client.notify(METHOD_INITIALIZED, json!({}))?;

        tracing::info!(
            server = %response.server_info.name,
            version = %response.server_info.version,
            protocol = %response.protocol_version,
            "session initialized"
        );

        Ok(InitializedMcpProtocol {
            client: self.client,
            connection: self.connection,
            timeout: self.timeout,
            gate: Mutex::new(()),
            initialize_response: response,
        })
    }
}

/// A ready client session.
#[derive(Debug)]
pub struct InitializedMcpProtocol {
    client: Arc<JsonRpcClient>,
    connection: Connection,
    timeout: Duration,
    gate: Mutex<()>,
    /// The server's answer to `initialize`.
    pub initialize_response: InitializeResponse,
}

impl InitializedMcpProtocol {
    async fn request<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: serde::Serialize + Send,
        R: serde::de::DeserializeOwned,
    {
        let _in_flight = self.gate.lock().await;
        self.client.request(method, params, self.timeout).await
    }

    /// Fetch the server's tool descriptors, in server order.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let response: ListToolsResponse = self.request(METHOD_TOOLS_LIST, json!({})).await?;
        Ok(response.tools)
    }

    /// Invoke `name` with `params` and return the tool's result unchanged.
    ///
    /// `params` must be a JSON object or `null`.
    ///
    /// # Errors
    ///
    /// A tool failure reported by the server surfaces as
    /// [`MailchimpMcpError::Remote`] carrying the server's error object.
    pub async fn call_tool(&self, name: &str, params: Value) -> Result<Value> {
        let params = match params {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(MailchimpMcpError::Config(format!(
                    "tool params must be a JSON object, got {other}"
                ))
                .into())
            }
        };
        self.request(
            METHOD_TOOLS_CALL,
            CallToolParams {
                name: name.to_string(),
                params: Some(params.unwrap_or_else(Map::new)),
            },
        )
        .await
    }

    /// Close the session and stop background tasks.
    pub fn close(self) {
        tracing::debug!("closing session");
        self.connection.shutdown();
    }
}
