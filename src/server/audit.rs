//! Audit logging for handled requests
//!
//! Every request the session answers is logged once at `info` with its method,
//! its parameters with credential-like values redacted, the outcome, and the
//! time taken.

use std::time::Duration;

use serde_json::Value;

use crate::mcp::types::ErrorObject;

const REDACTED: &str = "[REDACTED]";

/// Emit the audit record for one request.
pub fn record(
    method: &str,
    params: Option<&Value>,
    outcome: &std::result::Result<Value, ErrorObject>,
    elapsed: Duration,
) {
    let params = redact_params(params);
    match outcome {
        Ok(_) => tracing::info!(
            method = %method,
            params = %params,
            outcome = "success",
            elapsed_ms = elapsed.as_millis() as u64,
            "mcp action audited"
        ),
        Err(error) => tracing::info!(
            method = %method,
            params = %params,
            outcome = "failure",
            error_kind = %error.kind,
            error = %error.message,
            elapsed_ms = elapsed.as_millis() as u64,
            "mcp action audited"
        ),
    }
}

/// Copy of `params` with sensitive values replaced.
pub fn redact_params(params: Option<&Value>) -> Value {
    params.map(redact_value).unwrap_or(Value::Null)
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        _ => value.clone(),
    }
}

/// Returns `true` for keys whose values look like credentials.
pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "api_key" | "apikey" | "auth"
    ) || ["token", "secret", "password", "credential"]
        .iter()
        .any(|needle| normalized.contains(needle))
}
