//! Classic automation tools

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::gateway::Gateway;
use crate::mcp::types::ToolDescriptor;
use crate::server::registry::{ToolError, ToolHandler};
use crate::tools::{empty_params_schema, string_param, string_params_schema, summarize};

/// Lists every classic automation workflow.
#[derive(Debug, Clone)]
pub struct ListAutomationsTool {
    gateway: Arc<dyn Gateway>,
}

impl ListAutomationsTool {
    pub const NAME: &'static str = "list_automations";

    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "List all classic automation workflows in the Mailchimp account.",
            empty_params_schema(),
        )
    }
}

#[async_trait]
impl ToolHandler for ListAutomationsTool {
    async fn call(&self, _params: &Map<String, Value>) -> Result<Value, ToolError> {
        let body = self
            .gateway
            .request(Method::GET, &["automations"], None)
            .await?;
        // Untitled workflows are named by their creation time.
        Ok(summarize(&body, "automations", |workflow| {
            workflow.get("create_time")
        }))
    }
}

/// Starts all emails in an automation workflow.
#[derive(Debug, Clone)]
pub struct StartAutomationTool {
    gateway: Arc<dyn Gateway>,
}

impl StartAutomationTool {
    pub const NAME: &'static str = "start_automation";

    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "Start all emails in a specified automation workflow (activating the automation).",
            string_params_schema(&[("workflow_id", "ID of the automation workflow")]),
        )
    }
}

#[async_trait]
impl ToolHandler for StartAutomationTool {
    async fn call(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
        let workflow_id = string_param(Self::NAME, params, "workflow_id")?;
        self.gateway
            .request(
                Method::POST,
                &["automations", workflow_id, "actions", "start-all-emails"],
                None,
            )
            .await?;
        tracing::info!(workflow_id, "automation started");
        Ok(json!(format!("Automation workflow {} started.", workflow_id)))
    }
}
