//! Command handlers for the CLI
//!
//! - `serve`: run the tool server on this process's stdin/stdout
//! - `client`: spawn a server as a child process and drive it over stdio

pub mod client;
pub mod serve;
