//! Error types for mailchimp-mcp
//!
//! This module defines the crate-level error enum used throughout the
//! server, the stdio client, and the upstream gateway, using `thiserror` for
//! ergonomic error handling. Protocol-level failures that travel over the
//! wire are modelled separately by [`crate::mcp::types::ErrorObject`].

use thiserror::Error;

use crate::mcp::types::ErrorObject;

/// Main error type for mailchimp-mcp operations
///
/// Covers configuration loading, transport I/O, session lifecycle violations
/// on the client side, and remote protocol errors returned by the server.
#[derive(Error, Debug)]
pub enum MailchimpMcpError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Duplicate tool name at registry construction time
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// The transport closed or broke; the session cannot continue
    #[error("MCP transport failure: {0}")]
    TransportFailure(String),

    /// No response arrived within the request deadline
    #[error("MCP timeout waiting for `{method}` after {seconds}s")]
    Timeout {
        /// The method that timed out
        method: String,
        /// Deadline that elapsed, in seconds
        seconds: u64,
    },

    /// The server answered the request with an error object
    #[error("MCP error: {0}")]
    Remote(ErrorObject),

    /// The server selected a protocol version this client does not speak
    #[error("MCP protocol version mismatch: expected one of {expected:?}, got {got}")]
    ProtocolVersion {
        /// Versions this client accepts
        expected: Vec<String>,
        /// Version the server returned
        got: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl MailchimpMcpError {
    /// Returns the remote error object when this error came from the server.
    pub fn as_remote(&self) -> Option<&ErrorObject> {
        match self {
            Self::Remote(object) => Some(object),
            _ => None,
        }
    }
}

/// Result type alias for mailchimp-mcp operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
