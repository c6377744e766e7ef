//! MCP transport abstraction and implementations
//!
//! This module defines the [`Transport`] trait used by the client side of a
//! session. Concrete implementations live in submodules:
//!
//! - [`stdio::StdioTransport`] -- spawns the server as a child process and
//!   communicates over its stdin/stdout pipes (newline-delimited JSON).
//! - [`lines`] -- newline-delimited framing for the server side, which reads
//!   its own stdin and writes its own stdout.
//! - `fake::FakeTransport` -- in-process fake used in tests (cfg(test) only).
//!
//! # Design
//!
//! The [`Transport`] trait is intentionally minimal: callers `send` a
//! serialized JSON-RPC string and `receive` a stream of serialized JSON-RPC
//! strings (one per frame). The end of the `receive` stream is the sole
//! disconnect signal.
//!
//! The `receive_err` stream carries diagnostics (stderr output from the child
//! process). Diagnostic output is never treated as an error condition.

use std::pin::Pin;

use futures::Stream;

use crate::error::Result;

/// Abstraction over client-side transports.
///
/// All methods are `async` or return pinned [`Stream`]s so that transport
/// implementations can drive I/O without blocking the Tokio executor.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send a complete JSON-RPC message string to the remote peer.
    ///
    /// The string MUST be a single JSON object without embedded newlines; the
    /// transport appends the frame delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::MailchimpMcpError::TransportFailure`] if the
    /// underlying I/O channel is closed.
    async fn send(&self, message: String) -> Result<()>;

    /// Returns a stream of inbound JSON-RPC message strings.
    ///
    /// The stream ends when the transport is closed or the peer disconnects.
    fn receive(&self) -> Pin<Box<dyn Stream<Item = String> + Send + '_>>;

    /// Returns a stream of transport-level diagnostic strings.
    fn receive_err(&self) -> Pin<Box<dyn Stream<Item = String> + Send + '_>>;
}

pub mod lines;
pub mod stdio;

#[cfg(test)]
pub mod fake;
