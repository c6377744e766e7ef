//! Logging setup
//!
//! All logs go to stderr. When serving, stdout carries protocol frames and
//! nothing else may be written there.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "mailchimp_mcp=info";

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`]. With `json` set,
/// each event is written as one JSON object per line.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use mailchimp_mcp::logging::init_logging;
///
/// init_logging(false).expect("logging already initialized");
/// tracing::info!("ready");
/// ```
pub fn init_logging(json: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}
