//! `serve` command handler

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::MailchimpGateway;
use crate::server::{Dispatcher, ServerSession};
use crate::tools::build_registry;

/// Serve tools on stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be built, or the stdio stream fails.
pub async fn run_serve(config: Config) -> Result<()> {
    config.validate()?;

    let gateway = MailchimpGateway::new(&config.mailchimp)?;
    let registry = build_registry(Arc::new(gateway))?;
    let mut session = ServerSession::new(Dispatcher::new(Arc::new(registry)));

    session
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await
}
