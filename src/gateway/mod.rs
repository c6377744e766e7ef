//! Upstream HTTP gateway abstraction
//!
//! Tool handlers never talk HTTP directly; they go through a [`Gateway`],
//! which performs one authenticated request against the upstream REST API
//! and classifies the outcome:
//!
//! - [`GatewayError::Unreachable`] -- the request never produced a response
//!   (DNS, connect, TLS, timeout).
//! - [`GatewayError::Http`] -- the upstream answered with status >= 400.
//! - [`GatewayError::Decode`] -- a success body that is not JSON.

pub mod mailchimp;

pub use mailchimp::MailchimpGateway;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

/// Message used when an error body carries nothing usable.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure of a single upstream request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Network-layer failure reaching the upstream service
    #[error("Failed to connect to Mailchimp API: {0}")]
    Unreachable(String),

    /// The upstream service answered with an error status
    #[error("Mailchimp API error {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message extracted from the body
        message: String,
        /// Error body as JSON, or as a string when it was not JSON
        body: Value,
    },

    /// A success body could not be decoded
    #[error("Failed to decode Mailchimp response: {0}")]
    Decode(String),
}

/// One authenticated request against the upstream REST API.
///
/// `path` is a list of raw path segments appended to the configured base URL;
/// implementations percent-encode each segment.
#[async_trait]
pub trait Gateway: Send + Sync + std::fmt::Debug {
    /// Perform the request and decode the JSON body.
    ///
    /// Empty success bodies decode to [`Value::Null`].
    async fn request(
        &self,
        method: Method,
        path: &[&str],
        body: Option<Value>,
    ) -> std::result::Result<Value, GatewayError>;
}

/// Build an [`GatewayError::Http`] from a status and raw error body.
///
/// The message is the body's `detail`, else its `title`, else the compact JSON
/// text of the body, else the raw text, else [`UNKNOWN_ERROR`].
///
/// # Examples
///
/// ```
/// use mailchimp_mcp::gateway::{http_error, GatewayError};
///
/// let err = http_error(404, r#"{"title":"Resource Not Found","detail":"No such campaign"}"#);
/// match err {
///     GatewayError::Http { status, message, .. } => {
///         assert_eq!(status, 404);
///         assert_eq!(message, "No such campaign");
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn http_error(status: u16, text: &str) -> GatewayError {
    let (message, body) = match serde_json::from_str::<Value>(text) {
        Ok(json) => (extract_error_message(&json), json),
        Err(_) if text.trim().is_empty() => (UNKNOWN_ERROR.to_string(), Value::Null),
        Err(_) => (text.to_string(), Value::String(text.to_string())),
    };
    GatewayError::Http {
        status,
        message,
        body,
    }
}

fn extract_error_message(json: &Value) -> String {
    ["detail", "title"]
        .iter()
        .filter_map(|key| json.get(*key))
        .find_map(|field| match field {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null | Value::Bool(false) | Value::String(_) => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| json.to_string())
}
