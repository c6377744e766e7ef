//! Command-line interface definition for mailchimp-mcp
//!
//! This module defines the CLI structure using clap's derive API: a `serve`
//! command that runs the tool server over stdio, and two client commands that
//! spawn the server as a child process and talk to it.

use clap::{Parser, Subcommand};

/// mailchimp-mcp - Mailchimp tools over a stdio JSON-RPC session
#[derive(Parser, Debug, Clone)]
#[command(name = "mailchimp-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, env = "MAILCHIMP_MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Client request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the tool server on stdin/stdout
    Serve,

    /// Start a server, complete the handshake and print its tools
    Tools,

    /// Start a server and invoke one tool
    Call {
        /// Tool name, e.g. `list_campaigns`
        tool: String,

        /// Tool parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
