//! Informal parameter validation against a tool's input schema
//!
//! Only the parts of JSON Schema the tools actually use are checked:
//! `required` names and the primitive `type` of each declared property.
//! Undeclared parameters are passed through untouched.

use serde_json::{json, Map, Value};

use crate::mcp::types::{ErrorKind, ErrorObject, ToolDescriptor};

/// Check `params` against `tool.input_schema`.
///
/// A required parameter that is absent or `null` counts as missing; all
/// missing names are reported together.
///
/// # Errors
///
/// Returns an `InvalidParams` [`ErrorObject`] with detail `{tool, missing}` or
/// `{tool, field, expected}`.
pub fn validate_params(
    tool: &ToolDescriptor,
    params: &Map<String, Value>,
) -> std::result::Result<(), ErrorObject> {
    let schema = &tool.input_schema;

    let missing: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter(|name| params.get(*name).map_or(true, Value::is_null))
        .collect();

    if !missing.is_empty() {
        return Err(ErrorObject::new(
            ErrorKind::InvalidParams,
            format!(
                "Missing required parameter{} for `{}`: {}",
                if missing.len() == 1 { "" } else { "s" },
                tool.name,
                missing.join(", ")
            ),
        )
        .with_detail(json!({ "tool": tool.name, "missing": missing })));
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (field, value) in params {
        if value.is_null() {
            continue;
        }
        let Some(expected) = properties
            .get(field)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        if !matches_type(value, expected) {
            return Err(ErrorObject::new(
                ErrorKind::InvalidParams,
                format!(
                    "Parameter `{}` of `{}` must be of type {}",
                    field, tool.name, expected
                ),
            )
            .with_detail(json!({ "tool": tool.name, "field": field, "expected": expected })));
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ToolDescriptor {
        ToolDescriptor::new(
            "create_campaign",
            "Create",
            json!({
                "type": "object",
                "properties": {
                    "list_id": {"type": "string"},
                    "subject": {"type": "string"},
                    "count": {"type": "integer"}
                },
                "required": ["list_id", "subject"]
            }),
        )
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_params_pass() {
        assert!(validate_params(&tool(), &params(json!({"list_id": "l1", "subject": "Hi"}))).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let err = validate_params(&tool(), &Map::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParams);
        assert_eq!(
            err.detail,
            Some(json!({"tool": "create_campaign", "missing": ["list_id", "subject"]}))
        );
        assert!(err.message.contains("list_id, subject"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = validate_params(&tool(), &params(json!({"list_id": null, "subject": "Hi"})))
            .unwrap_err();
        assert_eq!(err.detail.unwrap()["missing"], json!(["list_id"]));
    }

    #[test]
    fn test_wrong_type_reports_field_and_expected() {
        let err = validate_params(&tool(), &params(json!({"list_id": 7, "subject": "Hi"})))
            .unwrap_err();
        assert_eq!(
            err.detail,
            Some(json!({"tool": "create_campaign", "field": "list_id", "expected": "string"}))
        );
    }

    #[test]
    fn test_integer_rejects_float() {
        let err = validate_params(
            &tool(),
            &params(json!({"list_id": "l", "subject": "s", "count": 1.5})),
        )
        .unwrap_err();
        assert_eq!(err.detail.unwrap()["field"], "count");
    }

    #[test]
    fn test_undeclared_params_pass_through() {
        assert!(validate_params(
            &tool(),
            &params(json!({"list_id": "l", "subject": "s", "extra": [1, 2]}))
        )
        .is_ok());
    }

    #[test]
    fn test_schema_without_required_accepts_empty() {
        let tool = ToolDescriptor::new("list_campaigns", "List", json!({"type": "object"}));
        assert!(validate_params(&tool, &Map::new()).is_ok());
    }
}
