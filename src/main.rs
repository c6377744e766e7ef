//! mailchimp-mcp - Mailchimp tools over a stdio JSON-RPC session
//!
#![doc = "Main entry point for the mailchimp-mcp server and client."]

use anyhow::Result;

use mailchimp_mcp::cli::{Cli, Commands};
use mailchimp_mcp::commands;
use mailchimp_mcp::config::Config;
use mailchimp_mcp::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.json_logs)?;

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    match &cli.command {
        Commands::Serve => {
            tracing::info!("Starting stdio tool server");
            commands::serve::run_serve(config).await
        }
        Commands::Tools => commands::client::list_tools(config, config_path).await,
        Commands::Call { tool, params } => {
            tracing::debug!(tool = %tool, "Calling tool");
            commands::client::call_tool(config, config_path, tool, params.as_deref()).await
        }
    }
}
