//! MCP transport surface: tool argument schemas, the concrete `Handler`,
//! the rmcp `ServerHandler` wrapper, and process wiring.

pub mod args;
pub mod builder;
pub mod handler;
pub mod init;
pub mod mcp_server;

pub use builder::{McpServerBuilder, ServerComponents};
pub use handler::McpHandler;
pub use init::run_server;
pub use mcp_server::McpServer;
