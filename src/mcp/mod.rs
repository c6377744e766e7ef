//! Protocol layer shared by the server and the stdio client
//!
//! # Module Layout
//!
//! - `types`     -- JSON-RPC primitives, error taxonomy, handshake and tool types
//! - `client`    -- Transport-agnostic async JSON-RPC 2.0 client
//! - `protocol`  -- Typed client session lifecycle over `JsonRpcClient`
//! - `transport` -- `Transport` trait, stdio child-process transport, and
//!   newline-delimited framing for the server side

pub mod client;
pub mod protocol;
pub mod transport;
pub mod types;

pub use types::*;
