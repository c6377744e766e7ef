//! Campaign tools: list, create and send

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::gateway::Gateway;
use crate::mcp::types::ToolDescriptor;
use crate::server::registry::{ToolError, ToolHandler};
use crate::tools::{empty_params_schema, string_param, string_params_schema, summarize};

/// Lists every campaign in the account.
#[derive(Debug, Clone)]
pub struct ListCampaignsTool {
    gateway: Arc<dyn Gateway>,
}

impl ListCampaignsTool {
    pub const NAME: &'static str = "list_campaigns";

    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "Retrieve all email campaigns in the Mailchimp account (returns basic info for each campaign).",
            empty_params_schema(),
        )
    }
}

#[async_trait]
impl ToolHandler for ListCampaignsTool {
    async fn call(&self, _params: &Map<String, Value>) -> Result<Value, ToolError> {
        let body = self
            .gateway
            .request(Method::GET, &["campaigns"], None)
            .await?;
        Ok(summarize(&body, "campaigns", |campaign| {
            campaign.pointer("/settings/subject_line")
        }))
    }
}

/// Creates a regular campaign addressed to one audience.
#[derive(Debug, Clone)]
pub struct CreateCampaignTool {
    gateway: Arc<dyn Gateway>,
}

impl CreateCampaignTool {
    pub const NAME: &'static str = "create_campaign";

    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "Create a new email campaign in Mailchimp (returns the new campaign's ID and status).",
            string_params_schema(&[
                ("list_id", "Audience (list) the campaign is sent to"),
                ("subject", "Subject line of the email"),
                ("from_name", "Sender name shown to recipients"),
                ("reply_to", "Reply-to email address"),
            ]),
        )
    }
}

#[async_trait]
impl ToolHandler for CreateCampaignTool {
    async fn call(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
        let list_id = string_param(Self::NAME, params, "list_id")?;
        let subject = string_param(Self::NAME, params, "subject")?;
        let from_name = string_param(Self::NAME, params, "from_name")?;
        let reply_to = string_param(Self::NAME, params, "reply_to")?;

        let payload = json!({
            "type": "regular",
            "recipients": { "list_id": list_id },
            "settings": {
                "subject_line": subject,
                "from_name": from_name,
                "reply_to": reply_to,
            }
        });

        let created = self
            .gateway
            .request(Method::POST, &["campaigns"], Some(payload))
            .await?;

        let status = created
            .get("status")
            .cloned()
            .unwrap_or_else(|| json!("created"));
        Ok(json!({
            "id": created.get("id").cloned().unwrap_or(Value::Null),
            "status": status,
        }))
    }
}

/// Sends a campaign that is ready to go.
#[derive(Debug, Clone)]
pub struct SendCampaignTool {
    gateway: Arc<dyn Gateway>,
}

impl SendCampaignTool {
    pub const NAME: &'static str = "send_campaign";

    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "Send a campaign that has been created (campaign must be ready to send).",
            string_params_schema(&[("campaign_id", "ID of the campaign to send")]),
        )
    }
}

#[async_trait]
impl ToolHandler for SendCampaignTool {
    async fn call(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
        let campaign_id = string_param(Self::NAME, params, "campaign_id")?;
        self.gateway
            .request(
                Method::POST,
                &["campaigns", campaign_id, "actions", "send"],
                None,
            )
            .await?;
        tracing::info!(campaign_id, "campaign sent");
        Ok(json!(format!("Campaign {} has been sent.", campaign_id)))
    }
}
