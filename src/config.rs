//! Configuration management for mailchimp-mcp
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{MailchimpMcpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Main configuration structure for mailchimp-mcp
///
/// Holds the upstream API settings used by the server and the request
/// settings used by the stdio client commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream Mailchimp Marketing API settings
    #[serde(default)]
    pub mailchimp: MailchimpConfig,
    /// Client-side session settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// Mailchimp Marketing API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct MailchimpConfig {
    /// API key; the suffix after the last `-` names the data center
    #[serde(default)]
    pub api_key: String,

    /// Data center, e.g. `us21`; derived from the API key when unset
    #[serde(default)]
    pub dc: Option<String>,

    /// Full base URL override (useful for tests and local mocks)
    ///
    /// When set, this replaces `https://{dc}.api.mailchimp.com/3.0` and the
    /// data center is not consulted.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request HTTP timeout
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

fn default_http_timeout() -> u64 {
    20
}

impl Default for MailchimpConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            dc: None,
            base_url: None,
            timeout_seconds: default_http_timeout(),
        }
    }
}

impl std::fmt::Debug for MailchimpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailchimpConfig")
            .field(
                "api_key",
                &if self.api_key.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("dc", &self.dc)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl MailchimpConfig {
    /// Data center to use: the explicit setting, else the API key suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use mailchimp_mcp::config::MailchimpConfig;
    ///
    /// let config = MailchimpConfig {
    ///     api_key: "0123456789abcdef-us21".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.data_center().as_deref(), Some("us21"));
    /// ```
    pub fn data_center(&self) -> Option<String> {
        if let Some(dc) = self.dc.as_deref().filter(|dc| !dc.trim().is_empty()) {
            return Some(dc.trim().to_string());
        }
        self.api_key
            .rsplit_once('-')
            .map(|(_, suffix)| suffix.trim())
            .filter(|suffix| !suffix.is_empty())
            .map(str::to_string)
    }

    /// Resolve the API base URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no base URL override is set and no
    /// data center can be determined, or when the resulting URL is invalid.
    pub fn base_url(&self) -> Result<Url> {
        let raw = match self.base_url.as_deref() {
            Some(url) => url.to_string(),
            None => {
                let dc = self.data_center().ok_or_else(|| {
                    MailchimpMcpError::Config(
                        "Cannot determine Mailchimp data center: set MAILCHIMP_DC or use an API key ending in -<dc>"
                            .to_string(),
                    )
                })?;
                format!("https://{}.api.mailchimp.com/3.0", dc)
            }
        };

        let url = Url::parse(&raw).map_err(|e| {
            MailchimpMcpError::Config(format!("Invalid Mailchimp base URL `{}`: {}", raw, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(MailchimpMcpError::Config(format!(
                "Mailchimp base URL must be an absolute http(s) URL, got `{}`",
                raw
            ))
            .into());
        }
        Ok(url)
    }

    /// HTTP timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Stdio client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Deadline for each request sent to the server
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    crate::mcp::client::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ClientConfig {
    /// Request deadline as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MailchimpMcpError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MailchimpMcpError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var("MAILCHIMP_API_KEY") {
            self.mailchimp.api_key = api_key;
        }

        if let Ok(dc) = std::env::var("MAILCHIMP_DC") {
            self.mailchimp.dc = Some(dc);
        }

        if let Ok(base_url) = std::env::var("MAILCHIMP_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: MAILCHIMP_BASE_URL");
            self.mailchimp.base_url = Some(base_url);
        }

        if let Ok(timeout) = std::env::var("MAILCHIMP_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.mailchimp.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid MAILCHIMP_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(timeout) = cli.timeout {
            self.client.request_timeout_seconds = timeout;
        }
    }

    /// Validate the settings the server needs
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty, the base URL cannot be resolved,
    /// or a timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.mailchimp.api_key.trim().is_empty() {
            return Err(MailchimpMcpError::Config(
                "Mailchimp API key is not set (MAILCHIMP_API_KEY)".to_string(),
            )
            .into());
        }

        self.mailchimp.base_url()?;

        if self.mailchimp.timeout_seconds == 0 {
            return Err(MailchimpMcpError::Config(
                "mailchimp.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        self.validate_client()
    }

    /// Validate the settings the stdio client commands need
    ///
    /// # Errors
    ///
    /// Returns error if the request timeout is zero
    pub fn validate_client(&self) -> Result<()> {
        if self.client.request_timeout_seconds == 0 {
            return Err(MailchimpMcpError::Config(
                "client.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: [&str; 4] = [
        "MAILCHIMP_API_KEY",
        "MAILCHIMP_DC",
        "MAILCHIMP_BASE_URL",
        "MAILCHIMP_TIMEOUT_SECONDS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn cli(args: &[&str]) -> crate::cli::Cli {
        let mut argv = vec!["mailchimp-mcp"];
        argv.extend_from_slice(args);
        argv.push("serve");
        crate::cli::Cli::try_parse_from(argv).unwrap()
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.mailchimp.api_key = "abc-us21".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.mailchimp.api_key.is_empty());
        assert_eq!(config.mailchimp.timeout_seconds, 20);
        assert_eq!(config.client.request_timeout_seconds, 30);
    }

    #[test]
    fn test_data_center_derived_from_last_dash() {
        let mut config = MailchimpConfig::default();
        config.api_key = "a-b-us7".to_string();
        assert_eq!(config.data_center().as_deref(), Some("us7"));

        config.api_key = "nodash".to_string();
        assert_eq!(config.data_center(), None);
    }

    #[test]
    fn test_explicit_data_center_wins() {
        let mut config = MailchimpConfig::default();
        config.api_key = "abc-us21".to_string();
        config.dc = Some("us3".to_string());
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://us3.api.mailchimp.com/3.0"
        );
    }

    #[test]
    fn test_base_url_override_skips_data_center() {
        let mut config = MailchimpConfig::default();
        config.base_url = Some("http://127.0.0.1:9999".to_string());
        assert_eq!(config.base_url().unwrap().as_str(), "http://127.0.0.1:9999/");
    }

    #[test]
    fn test_base_url_rejects_non_http_scheme() {
        let mut config = MailchimpConfig::default();
        config.base_url = Some("ftp://example.com".to_string());
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_validation_success() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validation_requires_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_validation_requires_data_center() {
        let mut config = Config::default();
        config.mailchimp.api_key = "nodash".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("data center"));
    }

    #[test]
    fn test_validation_zero_timeouts() {
        let mut config = valid_config();
        config.mailchimp.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.client.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
        assert!(config.validate_client().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = valid_config();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("abc-us21"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        clear_env();
        let config = Config::load("/nonexistent/config.yaml", &cli(&[])).unwrap();
        assert!(config.mailchimp.api_key.is_empty());
        assert_eq!(config.client.request_timeout_seconds, 30);
    }

    #[test]
    #[serial]
    fn test_load_from_yaml_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "mailchimp:\n  api_key: filekey-us5\n  timeout_seconds: 9\nclient:\n  request_timeout_seconds: 12"
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap(), &cli(&[])).unwrap();
        assert_eq!(config.mailchimp.api_key, "filekey-us5");
        assert_eq!(config.mailchimp.timeout_seconds, 9);
        assert_eq!(config.client.request_timeout_seconds, 12);
        assert_eq!(config.mailchimp.data_center().as_deref(), Some("us5"));
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_yaml() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mailchimp: [unclosed").unwrap();
        let err = Config::load(file.path().to_str().unwrap(), &cli(&[])).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mailchimp:\n  api_key: filekey-us5").unwrap();

        std::env::set_var("MAILCHIMP_API_KEY", "envkey-us9");
        std::env::set_var("MAILCHIMP_BASE_URL", "http://localhost:1234");
        std::env::set_var("MAILCHIMP_TIMEOUT_SECONDS", "not-a-number");
        let config = Config::load(file.path().to_str().unwrap(), &cli(&[])).unwrap();
        clear_env();

        assert_eq!(config.mailchimp.api_key, "envkey-us9");
        assert_eq!(
            config.mailchimp.base_url.as_deref(),
            Some("http://localhost:1234")
        );
        assert_eq!(config.mailchimp.timeout_seconds, 20);
    }

    #[test]
    #[serial]
    fn test_cli_timeout_override() {
        clear_env();
        let config = Config::load("/nonexistent/config.yaml", &cli(&["--timeout", "3"])).unwrap();
        assert_eq!(config.client.request_timeout(), Duration::from_secs(3));
    }
}
