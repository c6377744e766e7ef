//! Routing of tool traffic to the registry
//!
//! The dispatcher only sees requests from a ready session; handshake and
//! state checks live in [`crate::server::session`].

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::mcp::types::{
    CallToolParams, ErrorKind, ErrorObject, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use crate::server::errors::tool_error_object;
use crate::server::registry::ToolRegistry;
use crate::server::validation::validate_params;

/// Routes `tools/list` and `tools/call`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a fully built registry
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher serves
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request and return its result or error.
    ///
    /// Methods other than `tools/list` and `tools/call` yield `UnknownMethod`.
    pub async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> std::result::Result<Value, ErrorObject> {
        match method {
            METHOD_TOOLS_LIST => Ok(self.list_tools()),
            METHOD_TOOLS_CALL => self.call_tool(params).await,
            other => Err(ErrorObject::unknown_method(other)),
        }
    }

    fn list_tools(&self) -> Value {
        json!({ "tools": self.registry.list() })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, ErrorObject> {
        let call: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| {
                ErrorObject::new(
                    ErrorKind::InvalidParams,
                    format!("Invalid tools/call params: {}", e),
                )
            })?;

        let tool = self
            .registry
            .lookup(&call.name)
            .ok_or_else(|| ErrorObject::unknown_tool(&call.name))?;

        let args = call.params.unwrap_or_else(Map::new);
        validate_params(&tool.descriptor, &args)?;

        tracing::debug!(tool = %call.name, "invoking tool");
        tool.handler
            .call(&args)
            .await
            .map_err(|e| tool_error_object(&call.name, e))
    }
}
