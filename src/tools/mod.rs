//! Mailchimp operations exposed as tools
//!
//! Each tool is a small handler holding the shared [`Gateway`]. The set of
//! tools and their order in `tools/list` is fixed by [`build_registry`].

pub mod automations;
pub mod campaigns;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::server::errors::invalid_param;
use crate::server::registry::{ToolError, ToolRegistry};

pub use automations::{ListAutomationsTool, StartAutomationTool};
pub use campaigns::{CreateCampaignTool, ListCampaignsTool, SendCampaignTool};

/// Build the registry of every Mailchimp tool, in listing order.
///
/// # Errors
///
/// Returns an error if two tools share a name.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use mailchimp_mcp::config::MailchimpConfig;
/// use mailchimp_mcp::gateway::MailchimpGateway;
/// use mailchimp_mcp::tools::build_registry;
///
/// # fn main() -> mailchimp_mcp::error::Result<()> {
/// let config = MailchimpConfig {
///     api_key: "secret-us21".to_string(),
///     ..Default::default()
/// };
/// let registry = build_registry(Arc::new(MailchimpGateway::new(&config)?))?;
/// assert_eq!(registry.len(), 5);
/// # Ok(())
/// # }
/// ```
pub fn build_registry(gateway: Arc<dyn Gateway>) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    registry.register(
        ListCampaignsTool::descriptor(),
        Arc::new(ListCampaignsTool::new(Arc::clone(&gateway))),
    )?;
    registry.register(
        CreateCampaignTool::descriptor(),
        Arc::new(CreateCampaignTool::new(Arc::clone(&gateway))),
    )?;
    registry.register(
        SendCampaignTool::descriptor(),
        Arc::new(SendCampaignTool::new(Arc::clone(&gateway))),
    )?;
    registry.register(
        ListAutomationsTool::descriptor(),
        Arc::new(ListAutomationsTool::new(Arc::clone(&gateway))),
    )?;
    registry.register(
        StartAutomationTool::descriptor(),
        Arc::new(StartAutomationTool::new(gateway)),
    )?;

    tracing::debug!(count = registry.len(), "registered tools");
    Ok(registry)
}

/// Input schema with string properties, all of them required.
pub(crate) fn string_params_schema(fields: &[(&str, &str)]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({ "type": "string", "description": description }),
            )
        })
        .collect();
    let required: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Input schema for tools without parameters.
pub(crate) fn empty_params_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Fetch a string parameter, rejecting absent or non-string values.
pub(crate) fn string_param<'a>(
    tool: &str,
    params: &'a Map<String, Value>,
    field: &str,
) -> std::result::Result<&'a str, ToolError> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_param(tool, field, "string"))
}

/// Reduce an upstream collection response to `{id, name, status, emails_sent}`
/// records, in upstream order.
///
/// `name_fallback` picks the name when `settings.title` is empty or absent.
/// A body without the collection key yields an empty list.
pub(crate) fn summarize(
    body: &Value,
    collection: &str,
    name_fallback: impl Fn(&Value) -> Option<&Value>,
) -> Value {
    let records = body
        .get(collection)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    let name = present(item.pointer("/settings/title"))
                        .or_else(|| present(name_fallback(item)))
                        .cloned()
                        .unwrap_or(Value::Null);
                    json!({
                        "id": field(item, "id"),
                        "name": name,
                        "status": field(item, "status"),
                        "emails_sent": field(item, "emails_sent"),
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Value::Array(records)
}

fn field(item: &Value, key: &str) -> Value {
    item.get(key).cloned().unwrap_or(Value::Null)
}

// Empty strings count as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fake::FakeGateway;

    #[test]
    fn test_registry_order_and_names() {
        let registry = build_registry(Arc::new(FakeGateway::ok(Value::Null))).unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "list_campaigns",
                "create_campaign",
                "send_campaign",
                "list_automations",
                "start_automation"
            ]
        );
    }

    #[test]
    fn test_every_descriptor_is_an_object_schema() {
        let registry = build_registry(Arc::new(FakeGateway::ok(Value::Null))).unwrap();
        for tool in registry.list() {
            assert!(!tool.description.is_empty(), "{} has no description", tool.name);
            assert_eq!(tool.input_schema["type"], "object");
        }
    }

    #[test]
    fn test_string_params_schema_requires_all_fields() {
        let schema = string_params_schema(&[("a", "first"), ("b", "second")]);
        assert_eq!(schema["required"], json!(["a", "b"]));
        assert_eq!(schema["properties"]["b"]["type"], "string");
    }

    #[test]
    fn test_string_param_rejects_non_strings() {
        let params = json!({"id": 5}).as_object().cloned().unwrap();
        let err = string_param("send_campaign", &params, "id").unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
        assert!(string_param("send_campaign", &Map::new(), "id").is_err());
    }

    #[test]
    fn test_summarize_title_fallback_and_missing_fields() {
        let body = json!({
            "items": [
                {"id": "1", "settings": {"title": "Spring"}, "status": "sent", "emails_sent": 3},
                {"id": "2", "settings": {"title": "", "alt": "Fallback"}},
                {"id": "3"}
            ]
        });
        let records = summarize(&body, "items", |item| item.pointer("/settings/alt"));
        assert_eq!(
            records,
            json!([
                {"id": "1", "name": "Spring", "status": "sent", "emails_sent": 3},
                {"id": "2", "name": "Fallback", "status": null, "emails_sent": null},
                {"id": "3", "name": null, "status": null, "emails_sent": null}
            ])
        );
    }

    #[test]
    fn test_summarize_without_collection_is_empty() {
        assert_eq!(summarize(&Value::Null, "campaigns", |_| None), json!([]));
    }
}
