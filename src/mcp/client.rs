//! Transport-agnostic async JSON-RPC 2.0 client
//!
//! [`JsonRpcClient`] writes serialized requests to an outbound channel and
//! correlates responses arriving on an inbound channel. A background task
//! started with [`start_read_loop`] resolves pending requests as their
//! responses arrive.
//!
//! # Design
//!
//! - Request ids are a monotonically increasing `u64`, starting at 1.
//! - In-flight requests are tracked in a `pending` map keyed by id. Each entry
//!   is a `oneshot::Sender` that receives the `result` or `error`.
//! - When the inbound channel ends (the server went away) the read loop marks
//!   the client closed and drops every pending sender, so awaiting callers see
//!   a transport failure instead of hanging until their deadline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::{MailchimpMcpError, Result};
use crate::mcp::types::{ErrorObject, JsonRpcError, JsonRpcRequest};

/// Default deadline applied to every request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type PendingMap = HashMap<u64, oneshot::Sender<std::result::Result<Value, JsonRpcError>>>;

/// Channel-backed JSON-RPC 2.0 client.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
/// use mailchimp_mcp::mcp::client::{start_read_loop, JsonRpcClient};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let (out_tx, _out_rx) = mpsc::unbounded_channel::<String>();
///     let (_in_tx, in_rx) = mpsc::unbounded_channel::<String>();
///     let client = Arc::new(JsonRpcClient::new(out_tx));
///     let _loop = start_read_loop(in_rx, CancellationToken::new(), Arc::clone(&client));
///     Ok(())
/// }
/// ```
pub struct JsonRpcClient {
    next_id: AtomicU64,
    pending: Mutex<PendingMap>,
    outbound_tx: mpsc::UnboundedSender<String>,
    closed: AtomicBool,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl JsonRpcClient {
    /// Create a client that writes serialized messages to `outbound_tx`.
    pub fn new(outbound_tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            outbound_tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns `true` once the inbound side has ended.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a request and wait for its response.
    ///
    /// # Errors
    ///
    /// - [`MailchimpMcpError::TransportFailure`] when the connection is closed
    ///   before or while waiting.
    /// - [`MailchimpMcpError::Timeout`] when no response arrives in time.
    /// - [`MailchimpMcpError::Remote`] when the server answers with an error.
    /// - [`MailchimpMcpError::Serialization`] when the result does not decode
    ///   into `R`.
    pub async fn request<P, R>(&self, method: &str, params: P, timeout: Duration) -> Result<R>
    where
        P: serde::Serialize + Send,
        R: serde::de::DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        // Register before sending so a fast response always finds its slot.
        // `closed` only changes under the `pending` lock, so a slot is never
        // added after the read loop has cleared them.
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if self.is_closed() {
                return Err(MailchimpMcpError::TransportFailure("connection closed".into()).into());
            }
            pending.insert(id, tx);
        }

        let message = serde_json::to_string(&JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(Value::from(id)),
            method: method.to_string(),
            params: Some(serde_json::to_value(params)?),
        })?;

        tracing::debug!(id, method, "sending request");
        if self.outbound_tx.send(message).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(
                MailchimpMcpError::TransportFailure("outbound channel closed".into()).into(),
            );
        }

        let outcome = match tokio::time::timeout(timeout, rx).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(MailchimpMcpError::Timeout {
                    method: method.to_string(),
                    seconds: timeout.as_secs(),
                }
                .into());
            }
        };

        let rpc_result = outcome.map_err(|_| {
            MailchimpMcpError::TransportFailure("connection closed before response arrived".into())
        })?;

        let value =
            rpc_result.map_err(|e| MailchimpMcpError::Remote(ErrorObject::from_rpc(&e)))?;

        serde_json::from_value(value).map_err(|e| MailchimpMcpError::Serialization(e).into())
    }

    /// Send a notification; no response is expected.
    ///
    /// # Errors
    ///
    /// Returns [`MailchimpMcpError::TransportFailure`] if the outbound channel is
    /// closed.
    pub fn notify<P: serde::Serialize>(&self, method: &str, params: P) -> Result<()> {
        let message = serde_json::to_string(&JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.to_string(),
            params: Some(serde_json::to_value(params)?),
        })?;

        self.outbound_tx
            .send(message)
            .map_err(|_| MailchimpMcpError::TransportFailure("outbound channel closed".into()))?;
        Ok(())
    }

    async fn fail_pending(&self) {
        let mut pending = self.pending.lock().await;
        self.closed.store(true, Ordering::SeqCst);
        pending.clear();
    }
}

/// Start the response read loop as a background task.
///
/// The loop ends when `cancellation` fires or `inbound_rx` closes. In both
/// cases every pending request is failed.
pub fn start_read_loop(
    mut inbound_rx: mpsc::UnboundedReceiver<String>,
    cancellation: CancellationToken,
    client: Arc<JsonRpcClient>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                _ = cancellation.cancelled() => {
                    client.fail_pending().await;
                    break;
                }

                maybe_msg = inbound_rx.recv() => {
                    match maybe_msg {
                        Some(raw) => dispatch_message(&raw, &client).await,
                        None => {
                            tracing::debug!("inbound stream ended; failing pending requests");
                            client.fail_pending().await;
                            break;
                        }
                    }
                }
            }
        }
    })
}

async fn dispatch_message(raw: &str, client: &JsonRpcClient) {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("discarding unparseable frame from server: {e}");
            return;
        }
    };

    let is_response = value.get("method").is_none()
        && (value.get("result").is_some() || value.get("error").is_some());
    if !is_response {
        tracing::debug!("ignoring non-response message from server");
        return;
    }

    let Some(id) = value.get("id").and_then(Value::as_u64) else {
        tracing::warn!(id = %value["id"], "response carries no usable id");
        return;
    };

    let Some(tx) = client.pending.lock().await.remove(&id) else {
        tracing::debug!(id, "response for unknown or expired request");
        return;
    };

    let outcome = match value.get("error") {
        Some(error_val) => Err(serde_json::from_value::<JsonRpcError>(error_val.clone())
            .unwrap_or_else(|_| JsonRpcError {
                code: -32603,
                message: format!("malformed error object: {error_val}"),
                data: None,
            })),
        None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
    };

    // The caller may already have timed out.
    let _ = tx.send(outcome);
}
