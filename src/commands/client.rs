//! Client command handlers
//!
//! Both commands start `mailchimp-mcp serve` as a child process, complete the
//! handshake, issue their request, and close the session.

use std::collections::HashMap;
use std::sync::Arc;

use colored::Colorize;
use prettytable::{cell, format, row, Table};
use serde_json::Value;

use crate::config::Config;
use crate::error::{MailchimpMcpError, Result};
use crate::mcp::protocol::{InitializedMcpProtocol, McpProtocol};
use crate::mcp::transport::stdio::StdioTransport;
use crate::mcp::types::{ErrorObject, Implementation, ToolDescriptor};
use crate::server::errors::detail_status;

/// Environment variables forwarded to the child server.
///
/// The child starts with an empty environment.
const PASSTHROUGH_ENV: &[&str] = &["PATH", "HOME", "RUST_LOG"];

/// Print the tools offered by a freshly spawned server.
///
/// # Errors
///
/// Returns an error if the server cannot be started or the session fails.
pub async fn list_tools(config: Config, config_path: &str) -> Result<()> {
    let session = connect(&config, config_path).await?;
    let tools = session.list_tools().await;
    session.close();

    print_tools_table(&tools?);
    Ok(())
}

/// Invoke one tool on a freshly spawned server and print its result.
///
/// `params` is a JSON object in text form; `None` means no parameters.
///
/// # Errors
///
/// Returns an error if `params` is not valid JSON, the server cannot be
/// started, or the server answers with an error.
pub async fn call_tool(
    config: Config,
    config_path: &str,
    tool: &str,
    params: Option<&str>,
) -> Result<()> {
    let params = parse_params(params)?;

    let session = connect(&config, config_path).await?;
    let outcome = session.call_tool(tool, params).await;
    session.close();

    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            if let Some(remote) = e
                .downcast_ref::<MailchimpMcpError>()
                .and_then(MailchimpMcpError::as_remote)
            {
                print_remote_error(tool, remote);
            }
            Err(e)
        }
    }
}

async fn connect(config: &Config, config_path: &str) -> Result<InitializedMcpProtocol> {
    config.validate_client()?;

    let executable = std::env::current_exe()?;
    let args = vec![
        "--config".to_string(),
        config_path.to_string(),
        "serve".to_string(),
    ];
    let transport = StdioTransport::spawn(executable, args, child_env(), None)?;

    McpProtocol::connect(Arc::new(transport), config.client.request_timeout())
        .initialize(Implementation {
            name: format!("{}-client", env!("CARGO_PKG_NAME")),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
        .await
}

fn child_env() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("MAILCHIMP_") || PASSTHROUGH_ENV.contains(&key.as_str()))
        .collect()
}

fn parse_params(params: Option<&str>) -> Result<Value> {
    match params {
        None => Ok(Value::Null),
        Some(text) => serde_json::from_str(text).map_err(|e| {
            MailchimpMcpError::Config(format!("--params is not valid JSON: {}", e)).into()
        }),
    }
}

fn required_params(tool: &ToolDescriptor) -> String {
    let required: Vec<&str> = tool
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect();
    if required.is_empty() {
        "-".to_string()
    } else {
        required.join(", ")
    }
}

fn print_tools_table(tools: &[ToolDescriptor]) {
    if tools.is_empty() {
        println!("{}", "Server offers no tools.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["Name".bold(), "Parameters".bold(), "Description".bold()]);
    for tool in tools {
        table.add_row(row![tool.name.cyan(), required_params(tool), tool.description]);
    }

    println!("\nAvailable tools:");
    table.printstd();
    println!();
}

fn print_remote_error(tool: &str, error: &ErrorObject) {
    let status = detail_status(error)
        .map(|s| format!(" (HTTP {})", s))
        .unwrap_or_default();
    eprintln!(
        "{} {} failed [{}]{}: {}",
        "error:".red().bold(),
        tool,
        error.kind,
        status,
        error.message
    );
}
