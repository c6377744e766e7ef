//! Mapping of handler failures to wire error objects

use serde_json::{json, Value};

use crate::gateway::GatewayError;
use crate::mcp::types::{ErrorKind, ErrorObject};
use crate::server::registry::ToolError;

/// Convert a handler failure for `tool` into an [`ErrorObject`].
///
/// - [`GatewayError::Unreachable`] becomes `UpstreamUnreachable`.
/// - [`GatewayError::Http`] becomes `ToolInvocationError`; the message is the
///   text extracted from the upstream body and `detail` carries `status`,
///   `body` (that same text) and, when present, the `upstream` body as sent.
/// - [`GatewayError::Decode`] becomes `ToolInvocationError`.
/// - [`ToolError::InvalidParams`] becomes `InvalidParams`.
pub fn tool_error_object(tool: &str, error: ToolError) -> ErrorObject {
    match error {
        ToolError::InvalidParams { message, detail } => {
            ErrorObject::new(ErrorKind::InvalidParams, message).with_detail(detail)
        }
        ToolError::Gateway(gateway) => gateway_error_object(tool, gateway),
    }
}

fn gateway_error_object(tool: &str, error: GatewayError) -> ErrorObject {
    match error {
        GatewayError::Unreachable(ref reason) => {
            ErrorObject::new(ErrorKind::UpstreamUnreachable, error.to_string())
                .with_detail(json!({ "tool": tool, "reason": reason }))
        }
        GatewayError::Http {
            status,
            message,
            body,
        } => {
            let mut detail = json!({ "tool": tool, "status": status, "body": message });
            if !body.is_null() {
                detail["upstream"] = body;
            }
            ErrorObject::new(ErrorKind::ToolInvocationError, message).with_detail(detail)
        }
        GatewayError::Decode(ref reason) => {
            ErrorObject::new(ErrorKind::ToolInvocationError, error.to_string())
                .with_detail(json!({ "tool": tool, "reason": reason }))
        }
    }
}

/// Convenience for handlers that need to reject a parameter themselves.
pub fn invalid_param(tool: &str, field: &str, expected: &str) -> ToolError {
    ToolError::InvalidParams {
        message: format!("Parameter `{}` of `{}` must be of type {}", field, tool, expected),
        detail: json!({ "tool": tool, "field": field, "expected": expected }),
    }
}

/// Returns the value at `detail.status` as an integer, if any.
pub fn detail_status(object: &ErrorObject) -> Option<u64> {
    object
        .detail
        .as_ref()
        .and_then(|d| d.get("status"))
        .and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::http_error;
    use crate::mcp::types::{CODE_TOOL_INVOCATION, CODE_UPSTREAM_UNREACHABLE};

    #[test]
    fn test_http_error_maps_to_tool_invocation_error() {
        let err = http_error(404, r#"{"title":"Resource Not Found","detail":"No campaign abc123"}"#);
        let object = tool_error_object("send_campaign", err.into());

        assert_eq!(object.kind, ErrorKind::ToolInvocationError);
        assert_eq!(object.code, CODE_TOOL_INVOCATION);
        assert_eq!(object.message, "No campaign abc123");
        assert_eq!(detail_status(&object), Some(404));
        let detail = object.detail.unwrap();
        assert_eq!(detail["body"], "No campaign abc123");
        assert_eq!(detail["upstream"]["title"], "Resource Not Found");
    }

    #[test]
    fn test_http_error_with_empty_body_has_no_upstream() {
        let object = tool_error_object("list_campaigns", http_error(500, "").into());
        assert_eq!(object.message, "Unknown error");
        assert!(object.detail.unwrap().get("upstream").is_none());
    }

    #[test]
    fn test_unreachable_maps_to_upstream_unreachable() {
        let object = tool_error_object(
            "list_campaigns",
            GatewayError::Unreachable("connection refused".into()).into(),
        );
        assert_eq!(object.kind, ErrorKind::UpstreamUnreachable);
        assert_eq!(object.code, CODE_UPSTREAM_UNREACHABLE);
        assert!(object.message.contains("connection refused"));
    }

    #[test]
    fn test_decode_maps_to_tool_invocation_error() {
        let object = tool_error_object(
            "list_campaigns",
            GatewayError::Decode("expected value".into()).into(),
        );
        assert_eq!(object.kind, ErrorKind::ToolInvocationError);
        assert_eq!(detail_status(&object), None);
    }

    #[test]
    fn test_invalid_param_maps_to_invalid_params() {
        let object = tool_error_object(
            "send_campaign",
            invalid_param("send_campaign", "campaign_id", "string"),
        );
        assert_eq!(object.kind, ErrorKind::InvalidParams);
        assert_eq!(object.detail.unwrap()["field"], "campaign_id");
    }
}
