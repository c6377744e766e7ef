//! In-process fake peer for client session tests
//!
//! [`FakeTransport::pair`] returns the transport half that the client under
//! test owns, plus a [`FakePeer`] that plays the server: it reads the frames
//! the client wrote and answers them.
//!
//! ```text
//! client send()  -----> outbound -----> FakePeer::next_frame()
//! FakePeer::reply() --> inbound  -----> client receive()
//! ```
//!
//! Dropping the peer (or calling [`FakePeer::disconnect`]) ends the client's
//! `receive` stream, which is how tests simulate a server that went away.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};

use crate::error::{MailchimpMcpError, Result};
use crate::mcp::transport::Transport;

/// Transport half owned by the client under test.
#[derive(Debug)]
pub struct FakeTransport {
    outbound_tx: mpsc::UnboundedSender<String>,
    inbound_rx: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

/// Server half driven by the test body.
#[derive(Debug)]
pub struct FakePeer {
    outbound_rx: mpsc::UnboundedReceiver<String>,
    inbound_tx: mpsc::UnboundedSender<String>,
}

impl FakeTransport {
    /// Create a connected `(FakeTransport, FakePeer)` pair.
    pub fn pair() -> (Self, FakePeer) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();

        (
            Self {
                outbound_tx,
                inbound_rx: Arc::new(Mutex::new(inbound_rx)),
            },
            FakePeer {
                outbound_rx,
                inbound_tx,
            },
        )
    }
}

impl FakePeer {
    /// Next raw frame written by the client, or `None` once the client is gone.
    pub async fn next_frame(&mut self) -> Option<String> {
        self.outbound_rx.recv().await
    }

    /// Next frame written by the client, parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the client disconnected or wrote something that is not JSON.
    pub async fn next_message(&mut self) -> Value {
        let frame = self
            .next_frame()
            .await
            .expect("client closed the transport");
        serde_json::from_str(&frame).expect("client wrote a non-JSON frame")
    }

    /// Push a raw frame to the client.
    pub fn send_raw(&self, frame: impl Into<String>) {
        let _ = self.inbound_tx.send(frame.into());
    }

    /// Answer request `id` with a successful `result`.
    pub fn reply_ok(&self, id: &Value, result: Value) {
        self.send_raw(json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string());
    }

    /// Answer request `id` with an error object.
    pub fn reply_error(&self, id: &Value, code: i64, message: &str, data: Option<Value>) {
        let mut error = json!({"code": code, "message": message});
        if let Some(data) = data {
            error["data"] = data;
        }
        self.send_raw(json!({"jsonrpc": "2.0", "id": id, "error": error}).to_string());
    }

    /// Read the client's `initialize` request and complete the handshake.
    ///
    /// Returns the `initialize` request as sent. The trailing
    /// `notifications/initialized` frame is consumed too.
    pub async fn accept_handshake(&mut self, protocol_version: &str) -> Value {
        let request = self.next_message().await;
        self.reply_ok(
            &request["id"],
            json!({
                "protocolVersion": protocol_version,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "fake-server", "version": "0.0.0"}
            }),
        );
        let notification = self.next_message().await;
        assert_eq!(notification["method"], "notifications/initialized");
        request
    }

    /// Close the server side; the client's `receive` stream ends.
    pub fn disconnect(self) {}
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send(&self, message: String) -> Result<()> {
        self.outbound_tx.send(message).map_err(|_| {
            MailchimpMcpError::TransportFailure("fake peer disconnected".into()).into()
        })
    }

    fn receive(&self) -> Pin<Box<dyn Stream<Item = String> + Send + '_>> {
        let rx = Arc::clone(&self.inbound_rx);
        Box::pin(futures::stream::unfold(rx, |rx| async move {
            let mut guard = rx.lock().await;
            let item = guard.recv().await?;
            drop(guard);
            Some((item, rx))
        }))
    }

    fn receive_err(&self) -> Pin<Box<dyn Stream<Item = String> + Send + '_>> {
        Box::pin(futures::stream::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_client_frames_reach_peer_in_order() {
        let (transport, mut peer) = FakeTransport::pair();
        for i in 0..3 {
            transport.send(format!("{{\"n\":{}}}", i)).await.unwrap();
        }
        for i in 0..3 {
            assert_eq!(peer.next_message().await["n"], i);
        }
    }

    #[tokio::test]
    async fn test_peer_reply_reaches_client() {
        let (transport, peer) = FakeTransport::pair();
        peer.reply_error(&json!(7), -32601, "Method not found", None);

        let frame = transport.receive().next().await.unwrap();
        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["id"], 7);
        assert_eq!(parsed["error"]["code"], -32601);
        assert!(parsed["error"].get("data").is_none());
    }

    #[tokio::test]
    async fn test_disconnect_ends_receive_and_fails_send() {
        let (transport, peer) = FakeTransport::pair();
        peer.disconnect();

        assert!(transport.receive().next().await.is_none());
        let err = transport.send("{}".into()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MailchimpMcpError>(),
            Some(MailchimpMcpError::TransportFailure(_))
        ));
    }
}
