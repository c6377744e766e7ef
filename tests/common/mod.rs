use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailchimp_mcp::mcp::protocol::{InitializedMcpProtocol, McpProtocol};
use mailchimp_mcp::mcp::transport::stdio::StdioTransport;
use mailchimp_mcp::mcp::types::Implementation;

/// A config path that never exists, so only the environment configures the server.
pub const NO_CONFIG: &str = "/nonexistent/mailchimp-mcp/config.yaml";

/// API key used against the mock upstream
pub const TEST_API_KEY: &str = "testkey-us21";

#[allow(dead_code)]
pub fn server_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mailchimp-mcp"))
}

/// Environment for a server talking to `base_url`.
#[allow(dead_code)]
pub fn server_env(base_url: &str) -> HashMap<String, String> {
    HashMap::from([
        ("MAILCHIMP_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ("MAILCHIMP_BASE_URL".to_string(), base_url.to_string()),
    ])
}

/// Spawn `mailchimp-mcp serve` against `base_url` and complete the handshake.
#[allow(dead_code)]
pub async fn spawn_session(base_url: &str) -> InitializedMcpProtocol {
    let transport = StdioTransport::spawn(
        server_exe(),
        vec![
            "--config".to_string(),
            NO_CONFIG.to_string(),
            "serve".to_string(),
        ],
        server_env(base_url),
        None,
    )
    .expect("failed to spawn mailchimp-mcp serve");

    McpProtocol::connect(Arc::new(transport), Duration::from_secs(10))
        .initialize(Implementation {
            name: "integration-test".to_string(),
            version: "0.0.0".to_string(),
        })
        .await
        .expect("handshake failed")
}

/// Mock upstream serving two campaigns and one 404 for `abc123`.
#[allow(dead_code)]
pub async fn mailchimp_mock() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "campaigns": [
                {
                    "id": "c1",
                    "status": "sent",
                    "emails_sent": 1200,
                    "settings": {"title": "Spring Sale", "subject_line": "Save 20% today"}
                },
                {
                    "id": "c2",
                    "status": "save",
                    "emails_sent": 0,
                    "settings": {"title": "", "subject_line": "Draft newsletter"}
                }
            ],
            "total_items": 2
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/campaigns/abc123/actions/send"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "https://mailchimp.com/developer/marketing/docs/errors/",
            "title": "Resource Not Found",
            "status": 404,
            "detail": "The requested resource could not be found.",
            "instance": "e9d0c3c2"
        })))
        .mount(&server)
        .await;

    server
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
