//! Mailchimp Marketing API gateway
//!
//! Authenticates with HTTP Basic auth (any user name, the API key as
//! password) against `https://{dc}.api.mailchimp.com/3.0` or a configured
//! base URL override.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

use crate::config::MailchimpConfig;
use crate::error::{MailchimpMcpError, Result};
use crate::gateway::{http_error, Gateway, GatewayError};

const BASIC_AUTH_USER: &str = "anystring";

/// [`Gateway`] backed by `reqwest`.
///
/// # Examples
///
/// ```no_run
/// use mailchimp_mcp::config::MailchimpConfig;
/// use mailchimp_mcp::gateway::{Gateway, MailchimpGateway};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = MailchimpConfig {
///     api_key: "0123456789abcdef-us21".to_string(),
///     ..Default::default()
/// };
/// let gateway = MailchimpGateway::new(&config)?;
/// let campaigns = gateway.request(reqwest::Method::GET, &["campaigns"], None).await?;
/// # Ok(())
/// # }
/// ```
pub struct MailchimpGateway {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for MailchimpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailchimpGateway")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl MailchimpGateway {
    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL cannot be resolved, or
    /// an HTTP error if the client cannot be constructed.
    pub fn new(config: &MailchimpConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("mailchimp-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MailchimpMcpError::Http)?;

        tracing::info!(base_url = %base_url, "Initialized Mailchimp gateway");

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// The resolved base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &[&str]) -> std::result::Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Unreachable(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }
}

#[async_trait]
impl Gateway for MailchimpGateway {
    async fn request(
        &self,
        method: Method,
        path: &[&str],
        body: Option<Value>,
    ) -> std::result::Result<Value, GatewayError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%method, url = %url, "Mailchimp request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key));
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Failed to reach Mailchimp: {}", e);
            GatewayError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Unreachable(format!("failed to read response body: {}", e)))?;

        if status.as_u16() >= 400 {
            tracing::error!("Mailchimp returned error {}: {}", status, text);
            return Err(http_error(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Mailchimp response from {}: {}", url, e);
            GatewayError::Decode(e.to_string())
        })
    }
}
