//! Tool registry
//!
//! Maps tool names to `(descriptor, handler)` pairs. The registry is built once
//! at startup and shared read-only afterwards; registration order is the order
//! `tools/list` reports.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{MailchimpMcpError, Result};
use crate::gateway::GatewayError;
use crate::mcp::types::ToolDescriptor;

/// Failure reported by a tool handler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// The handler rejected its parameters
    #[error("{message}")]
    InvalidParams {
        /// Human-readable summary
        message: String,
        /// Structured context, e.g. `{field, expected}`
        detail: Value,
    },

    /// The upstream call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Handler invoked for `tools/call`.
///
/// Handlers receive parameters that already passed validation against the
/// tool's input schema.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool and return its result value.
    async fn call(&self, params: &Map<String, Value>) -> std::result::Result<Value, ToolError>;
}

/// A registered tool.
#[derive(Clone)]
pub struct RegisteredTool {
    /// What `tools/list` reports for this tool
    pub descriptor: ToolDescriptor,
    /// The handler behind it
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Ordered, name-unique collection of tools.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use serde_json::{json, Map, Value};
/// use mailchimp_mcp::mcp::types::ToolDescriptor;
/// use mailchimp_mcp::server::registry::{ToolError, ToolHandler, ToolRegistry};
///
/// struct Echo;
///
/// #[async_trait]
/// impl ToolHandler for Echo {
///     async fn call(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
///         Ok(Value::Object(params.clone()))
///     }
/// }
///
/// let mut registry = ToolRegistry::new();
/// registry
///     .register(ToolDescriptor::new("echo", "Echo params", json!({"type": "object"})), Arc::new(Echo))
///     .unwrap();
/// assert!(registry.lookup("echo").is_some());
/// assert!(registry.register(ToolDescriptor::new("echo", "again", json!({})), Arc::new(Echo)).is_err());
/// ```
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool.
    ///
    /// # Errors
    ///
    /// Returns [`MailchimpMcpError::DuplicateTool`] if the name is taken.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<()> {
        if self.index.contains_key(&descriptor.name) {
            return Err(MailchimpMcpError::DuplicateTool(descriptor.name).into());
        }
        tracing::debug!(tool = %descriptor.name, "registered tool");
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// All descriptors in registration order
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Find a tool by exact name
    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` when no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
