//! Stdio transport for the client side of a session
//!
//! This module implements [`StdioTransport`], which spawns the tool server as
//! a child process and talks to it over the child's stdin/stdout pipes using
//! newline-delimited JSON framing.
//!
//! # Protocol
//!
//! - Outbound messages are written to the child's stdin as a single JSON
//!   object followed by a newline (`\n`).
//! - Inbound messages are read from the child's stdout, one JSON object per
//!   line (newline stripped before delivery).
//! - The child's stderr is forwarded to a diagnostic stream and logged via
//!   `tracing::debug!`. It is never treated as an error condition.
//!
//! # Lifecycle
//!
//! The transport is created via [`StdioTransport::spawn`]. Three background
//! Tokio tasks are started immediately: a stdin writer, a stdout reader and a
//! stderr reader. Process exit or stream closure ends the `receive` stream,
//! which is the only disconnect signal. When the [`StdioTransport`] is
//! dropped, a best-effort SIGTERM (Unix) or `start_kill` (non-Unix) is sent to
//! the child.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use futures::Stream;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Mutex};

use crate::error::{MailchimpMcpError, Result};
use crate::mcp::transport::Transport;

/// Stdio-based transport that drives a child server process.
///
/// # Examples
///
/// ```no_run
/// use std::collections::HashMap;
/// use mailchimp_mcp::mcp::transport::stdio::StdioTransport;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let transport = StdioTransport::spawn(
///     "mailchimp-mcp".into(),
///     vec!["serve".into()],
///     HashMap::new(),
///     None,
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StdioTransport {
    /// Sender side of the stdin channel; `send()` writes here.
    stdin_tx: mpsc::UnboundedSender<String>,
    /// Shared receiver for stdout lines (one JSON message per line).
    stdout_rx: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    /// Shared receiver for stderr lines (diagnostics only).
    stderr_rx: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    /// Handle to the spawned child process; used by `Drop`.
    child: Arc<Mutex<Child>>,
}

impl StdioTransport {
    /// Spawn a child process and wire up stdio pipes.
    ///
    /// The environment of the child is built by clearing all inherited
    /// variables and then applying `env`, so credentials reach the server
    /// only when the caller passes them explicitly.
    ///
    /// # Arguments
    ///
    /// * `executable` - Path to the server executable.
    /// * `args` - Command-line arguments passed to the executable.
    /// * `env` - Environment variables for the child process.
    /// * `working_dir` - Optional working directory for the child process.
    ///
    /// # Errors
    ///
    /// Returns [`MailchimpMcpError::TransportFailure`] if the process cannot be
    /// spawned or if the stdio pipes are unavailable.
    pub fn spawn(
        executable: PathBuf,
        args: Vec<String>,
        env: HashMap<String, String>,
        working_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let mut cmd = Command::new(&executable);
        cmd.args(&args);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.env_clear().envs(&env);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            MailchimpMcpError::TransportFailure(format!(
                "failed to spawn MCP server `{}`: {}",
                executable.display(),
                e
            ))
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            MailchimpMcpError::TransportFailure("child stdin unavailable after spawn".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            MailchimpMcpError::TransportFailure("child stdout unavailable after spawn".into())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            MailchimpMcpError::TransportFailure("child stderr unavailable after spawn".into())
        })?;

        let (stdin_tx, mut stdin_rx) = mpsc::unbounded_channel::<String>();
        let (stdout_tx, stdout_rx) = mpsc::unbounded_channel::<String>();
        let (stderr_tx, stderr_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            let mut stdin = stdin;
            while let Some(msg) = stdin_rx.recv().await {
                let line = format!("{}\n", msg);
                if stdin.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if stdin.flush().await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                if stdout_tx.send(line).is_err() {
                    break;
                }
            }
            tracing::debug!("mcp server stdout closed");
        });

        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "mailchimp_mcp::server_stderr", "{}", line);
                if stderr_tx.send(line).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            stdin_tx,
            stdout_rx: Arc::new(Mutex::new(stdout_rx)),
            stderr_rx: Arc::new(Mutex::new(stderr_rx)),
            child: Arc::new(Mutex::new(child)),
        })
    }
}

fn channel_stream(
    rx: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
) -> Pin<Box<dyn Stream<Item = String> + Send + 'static>> {
    Box::pin(futures::stream::unfold(rx, |rx| async move {
        let mut guard = rx.lock().await;
        let item = guard.recv().await?;
        drop(guard);
        Some((item, rx))
    }))
}

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn send(&self, message: String) -> Result<()> {
        self.stdin_tx.send(message).map_err(|e| {
            MailchimpMcpError::TransportFailure(format!("stdin channel closed: {}", e)).into()
        })
    }

    fn receive(&self) -> Pin<Box<dyn Stream<Item = String> + Send + '_>> {
        channel_stream(Arc::clone(&self.stdout_rx))
    }

    fn receive_err(&self) -> Pin<Box<dyn Stream<Item = String> + Send + '_>> {
        channel_stream(Arc::clone(&self.stderr_rx))
    }
}

impl Drop for StdioTransport {
    /// Best-effort, non-blocking termination of the child process.
    fn drop(&mut self) {
        // If the lock is held elsewhere, skip; the OS reaps the child when we exit.
        if let Ok(child) = self.child.try_lock() {
            #[cfg(unix)]
            {
                if let Some(pid) = child.id() {
                    // SAFETY: pid is a valid process ID obtained from tokio::process::Child.
                    unsafe {
                        libc::kill(pid as libc::pid_t, libc::SIGTERM);
                    }
                }
            }
            #[cfg(not(unix))]
            {
                let mut child = child;
                let _ = child.start_kill();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_spawn_nonexistent_executable_returns_transport_failure() {
        let result = StdioTransport::spawn(
            PathBuf::from("/nonexistent/binary/that/does/not/exist"),
            vec![],
            HashMap::new(),
            None,
        );
        let err = result.expect_err("expected error for missing executable");
        assert!(matches!(
            err.downcast_ref::<MailchimpMcpError>(),
            Some(MailchimpMcpError::TransportFailure(_))
        ));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[tokio::test]
    async fn test_cat_echoes_frame_back_on_receive() {
        // `cat` echoes stdin to stdout, standing in for a server.
        let transport = match StdioTransport::spawn(PathBuf::from("cat"), vec![], HashMap::new(), None) {
            Ok(t) => t,
            Err(_) => return,
        };

        let msg = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#.to_string();
        transport.send(msg.clone()).await.unwrap();

        let mut stream = transport.receive();
        let received = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended unexpectedly");

        assert_eq!(received, msg);
    }

    #[tokio::test]
    async fn test_receive_ends_when_child_exits() {
        let transport = match StdioTransport::spawn(PathBuf::from("true"), vec![], HashMap::new(), None) {
            Ok(t) => t,
            Err(_) => return,
        };

        let mut stream = transport.receive();
        let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("stream should end promptly after child exit");
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_receive_err_empty_when_no_stderr() {
        let transport = match StdioTransport::spawn(PathBuf::from("cat"), vec![], HashMap::new(), None) {
            Ok(t) => t,
            Err(_) => return,
        };

        let mut err_stream = transport.receive_err();
        let result = tokio::time::timeout(Duration::from_millis(100), err_stream.next()).await;
        assert!(result.is_err(), "expected timeout (no stderr)");
    }
}
