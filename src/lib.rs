//! codeindex-mcp - a local-first code indexing and retrieval engine
//! exposed over MCP.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod server;

pub use domain::error::{Error, Result};

pub use server::builder::McpServerBuilder;
pub use server::init::run_server;
pub use server::mcp_server::McpServer;
