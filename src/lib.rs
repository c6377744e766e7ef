//! mailchimp-mcp - Mailchimp operations as tools over stdio JSON-RPC
//!
//! A server process exposes campaign and automation operations as named
//! tools; a client process connects over the server's stdin/stdout, performs
//! the `initialize` handshake, and then lists or calls tools.
//!
//! # Architecture
//!
//! - `server`: session state machine, dispatcher, tool registry, error mapping
//! - `tools`: the Mailchimp tool handlers and the registry they are built into
//! - `gateway`: authenticated HTTP access to the Mailchimp Marketing API
//! - `mcp`: wire types, stdio transport, and the client session
//! - `config`: configuration loading and validation
//! - `error`: error types and result alias
//! - `cli` / `commands`: command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mailchimp_mcp::mcp::protocol::McpProtocol;
//! use mailchimp_mcp::mcp::transport::stdio::StdioTransport;
//! use mailchimp_mcp::mcp::types::Implementation;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = StdioTransport::spawn(
//!         "mailchimp-mcp".into(),
//!         vec!["serve".to_string()],
//!         std::env::vars().collect(),
//!         None,
//!     )?;
//!     let session = McpProtocol::connect(Arc::new(transport), std::time::Duration::from_secs(30))
//!         .initialize(Implementation { name: "demo".into(), version: "0.1.0".into() })
//!         .await?;
//!     for tool in session.list_tools().await? {
//!         println!("{}", tool.name);
//!     }
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod mcp;
pub mod server;
pub mod tools;

pub use config::Config;
pub use error::{MailchimpMcpError, Result};
