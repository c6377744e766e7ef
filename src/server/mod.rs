//! Server side of the tool protocol
//!
//! Frames arrive on stdin and pass through [`session::ServerSession`], which
//! owns the handshake, to [`dispatcher::Dispatcher`], which routes tool
//! traffic to handlers held in a [`registry::ToolRegistry`].

pub mod audit;
pub mod dispatcher;
pub mod errors;
pub mod registry;
pub mod session;
pub mod validation;

pub use dispatcher::Dispatcher;
pub use registry::{ToolError, ToolHandler, ToolRegistry};
pub use session::{ServerSession, SessionState};
