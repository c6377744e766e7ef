//! MCP protocol types and JSON-RPC 2.0 primitives
//!
//! This module defines every wire type exchanged between the stdio client and
//! the tool server: the JSON-RPC envelope, the `initialize` handshake payloads,
//! tool descriptors, `tools/call` parameters, and the structured
//! [`ErrorObject`] carried in place of a result. Struct fields are `camelCase`
//! on the wire via `#[serde(rename_all = "camelCase")]`, and `Option<>` fields
//! omit their key from JSON when `None`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Protocol version constants
// ---------------------------------------------------------------------------

/// The most recent supported MCP protocol revision.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// All protocol versions accepted during negotiation, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &[
    LATEST_PROTOCOL_VERSION,
    "2025-03-26",
    "2024-11-05",
];

// ---------------------------------------------------------------------------
// JSON-RPC method constants
// ---------------------------------------------------------------------------

/// Lifecycle: client sends `initialize` to open a session.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Lifecycle: client sends `notifications/initialized` after the server ACKs.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
/// Request the ordered list of registered tools.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Invoke a named tool.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

// ---------------------------------------------------------------------------
// JSON-RPC error codes
// ---------------------------------------------------------------------------

/// The frame was not valid JSON.
pub const CODE_PARSE_ERROR: i64 = -32700;
/// The frame was JSON but not a valid request.
pub const CODE_INVALID_REQUEST: i64 = -32600;
/// The method is not one the server handles.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// Parameters failed validation.
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// A request arrived before the `initialize` handshake completed.
pub const CODE_NOT_INITIALIZED: i64 = -32002;
/// `tools/call` named a tool the registry does not hold.
pub const CODE_UNKNOWN_TOOL: i64 = -32003;
/// The tool handler failed, usually with an upstream HTTP error.
pub const CODE_TOOL_INVOCATION: i64 = -32004;
/// The upstream service could not be reached.
pub const CODE_UPSTREAM_UNREACHABLE: i64 = -32005;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 wire types
// ---------------------------------------------------------------------------

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

/// A JSON-RPC 2.0 request object.
///
/// `id` is `None` only for notifications. A missing `jsonrpc` member is
/// tolerated on input and defaults to `"2.0"`.
///
/// # Examples
///
/// ```
/// use mailchimp_mcp::mcp::types::JsonRpcRequest;
///
/// let req = JsonRpcRequest {
///     jsonrpc: "2.0".to_string(),
///     id: Some(serde_json::json!(1)),
///     method: "tools/list".to_string(),
///     params: None,
/// };
/// assert_eq!(serde_json::to_value(&req).unwrap()["id"], 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version identifier; always `"2.0"`.
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    /// Request correlation identifier. Present for requests, absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result` or `error` is present in a valid response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version identifier; always `"2.0"`.
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    /// Mirrors the `id` from the corresponding request (`null` when unknown).
    pub id: Value,
    /// Successful result value; mutually exclusive with `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object; mutually exclusive with `result`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a successful response carrying `result` unchanged.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response from a structured [`ErrorObject`].
    pub fn failure(id: Value, error: &ErrorObject) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            result: None,
            error: Some(error.to_rpc()),
        }
    }
}

/// A JSON-RPC 2.0 error object.
///
/// Implements `Display` as `"JSON-RPC error {code}: {message}"`.
///
/// # Examples
///
/// ```
/// use mailchimp_mcp::mcp::types::JsonRpcError;
///
/// let e = JsonRpcError { code: -32600, message: "Invalid Request".to_string(), data: None };
/// assert_eq!(e.to_string(), "JSON-RPC error -32600: Invalid Request");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code as defined by JSON-RPC 2.0 or this server.
    pub code: i64,
    /// Human-readable error description.
    pub message: String,
    /// Optional additional error context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

// ---------------------------------------------------------------------------
// Structured protocol errors
// ---------------------------------------------------------------------------

/// Symbolic classification of a protocol-level failure.
///
/// Serialized on the wire as the variant name inside `error.data.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Request before handshake, malformed frame, or repeated `initialize`.
    ProtocolViolation,
    /// The method is not `initialize`, `tools/list` or `tools/call`.
    UnknownMethod,
    /// `tools/call` named a tool that is not registered.
    UnknownTool,
    /// Tool parameters are missing or of the wrong shape.
    InvalidParams,
    /// The tool handler failed; wraps an upstream failure.
    ToolInvocationError,
    /// The upstream service could not be reached at all.
    UpstreamUnreachable,
}

impl ErrorKind {
    /// Default JSON-RPC code for this kind.
    pub fn default_code(self) -> i64 {
        match self {
            Self::ProtocolViolation => CODE_INVALID_REQUEST,
            Self::UnknownMethod => CODE_METHOD_NOT_FOUND,
            Self::UnknownTool => CODE_UNKNOWN_TOOL,
            Self::InvalidParams => CODE_INVALID_PARAMS,
            Self::ToolInvocationError => CODE_TOOL_INVOCATION,
            Self::UpstreamUnreachable => CODE_UPSTREAM_UNREACHABLE,
        }
    }

    /// Best-effort classification of a bare JSON-RPC code.
    pub fn from_code(code: i64) -> Self {
        match code {
            CODE_METHOD_NOT_FOUND => Self::UnknownMethod,
            CODE_INVALID_PARAMS => Self::InvalidParams,
            CODE_UNKNOWN_TOOL => Self::UnknownTool,
            CODE_UPSTREAM_UNREACHABLE => Self::UpstreamUnreachable,
            CODE_PARSE_ERROR | CODE_INVALID_REQUEST | CODE_NOT_INITIALIZED => {
                Self::ProtocolViolation
            }
            _ => Self::ToolInvocationError,
        }
    }

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProtocolViolation => "ProtocolViolation",
            Self::UnknownMethod => "UnknownMethod",
            Self::UnknownTool => "UnknownTool",
            Self::InvalidParams => "InvalidParams",
            Self::ToolInvocationError => "ToolInvocationError",
            Self::UpstreamUnreachable => "UpstreamUnreachable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure payload returned in place of a result.
///
/// Encoded as a JSON-RPC error whose `data` is `{"kind": ..., "detail": ...}`.
///
/// # Examples
///
/// ```
/// use mailchimp_mcp::mcp::types::{ErrorKind, ErrorObject};
///
/// let err = ErrorObject::new(ErrorKind::ToolInvocationError, "Resource Not Found")
///     .with_detail(serde_json::json!({ "status": 404, "body": "Resource Not Found" }));
/// let rpc = err.to_rpc();
/// assert_eq!(rpc.code, -32004);
/// assert_eq!(rpc.data.unwrap()["detail"]["status"], 404);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorObject {
    /// Symbolic kind.
    pub kind: ErrorKind,
    /// JSON-RPC integer code.
    pub code: i64,
    /// Concise human-readable summary.
    pub message: String,
    /// Optional structured context (e.g. upstream status and body).
    pub detail: Option<Value>,
}

impl ErrorObject {
    /// Create an error of `kind` with its default code.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            message: message.into(),
            detail: None,
        }
    }

    /// Override the JSON-RPC code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Attach structured detail.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// A frame that could not be parsed as JSON.
    pub fn parse_error(reason: impl fmt::Display) -> Self {
        Self::new(ErrorKind::ProtocolViolation, format!("Parse error: {reason}"))
            .with_code(CODE_PARSE_ERROR)
    }

    /// A request that arrived before the handshake.
    pub fn not_initialized(method: &str) -> Self {
        Self::new(
            ErrorKind::ProtocolViolation,
            format!("Session not initialized; `{method}` requires a completed `initialize`"),
        )
        .with_code(CODE_NOT_INITIALIZED)
        .with_detail(json!({ "method": method }))
    }

    /// A method the server does not handle.
    pub fn unknown_method(method: &str) -> Self {
        Self::new(ErrorKind::UnknownMethod, format!("Method not found: {method}"))
            .with_detail(json!({ "method": method }))
    }

    /// A tool name absent from the registry.
    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ErrorKind::UnknownTool, format!("Unknown tool: {name}"))
            .with_detail(json!({ "name": name }))
    }

    /// Encode as a JSON-RPC error.
    pub fn to_rpc(&self) -> JsonRpcError {
        let mut data = Map::new();
        data.insert("kind".to_string(), Value::String(self.kind.as_str().into()));
        if let Some(detail) = &self.detail {
            data.insert("detail".to_string(), detail.clone());
        }
        JsonRpcError {
            code: self.code,
            message: self.message.clone(),
            data: Some(Value::Object(data)),
        }
    }

    /// Decode from a JSON-RPC error, falling back to the code when `data.kind`
    /// is absent or unrecognised.
    pub fn from_rpc(error: &JsonRpcError) -> Self {
        let data = error.data.as_ref();
        let kind = data
            .and_then(|d| d.get("kind"))
            .and_then(|k| serde_json::from_value::<ErrorKind>(k.clone()).ok())
            .unwrap_or_else(|| ErrorKind::from_code(error.code));
        Self {
            kind,
            code: error.code,
            message: error.message.clone(),
            detail: data.and_then(|d| d.get("detail")).cloned(),
        }
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// ---------------------------------------------------------------------------
// Initialize types
// ---------------------------------------------------------------------------

/// Identifies a client or server implementation by name and version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    /// Short name of the implementation (e.g. `"mailchimp-mcp"`).
    pub name: String,
    /// Semantic version string.
    pub version: String,
}

/// Capabilities a client advertises. Currently opaque to the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    /// Experimental capability extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
}

/// Capabilities a server advertises.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Server exposes tools via `tools/list` and `tools/call`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
}

/// Parameters sent by the client in the `initialize` request.
///
/// Every field is optional on input; a bare `{"method":"initialize"}` is a
/// valid handshake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// The protocol version the client wishes to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
    /// Capabilities advertised by this client.
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    /// Information identifying this client implementation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<Implementation>,
}

/// Response returned by the server to an `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    /// The protocol version the server selected for this session.
    pub protocol_version: String,
    /// Capabilities advertised by this server.
    pub capabilities: ServerCapabilities,
    /// Information identifying this server implementation.
    pub server_info: Implementation,
}

// ---------------------------------------------------------------------------
// Tool types
// ---------------------------------------------------------------------------

/// A tool exposed by the server: name, description, and input shape.
///
/// # Examples
///
/// ```
/// use mailchimp_mcp::mcp::types::ToolDescriptor;
///
/// let tool = ToolDescriptor::new(
///     "send_campaign",
///     "Send a campaign",
///     serde_json::json!({ "type": "object", "required": ["campaign_id"] }),
/// );
/// let json = serde_json::to_value(&tool).unwrap();
/// assert_eq!(json["inputSchema"]["required"][0], "campaign_id");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique name of the tool within the registry.
    pub name: String,
    /// Human-readable description of the tool's purpose.
    pub description: String,
    /// JSON Schema describing the accepted parameters.
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Response to a `tools/list` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    /// Every registered tool, in registration order.
    pub tools: Vec<ToolDescriptor>,
}

/// Parameters for a `tools/call` request.
///
/// The MCP spelling `arguments` is accepted as an alias for `params`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to invoke.
    pub name: String,
    /// Parameters passed to the tool.
    #[serde(default, alias = "arguments", skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}
