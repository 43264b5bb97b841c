//! Process entry point: load configuration, assemble the server
//! components, start the filesystem watcher, and serve MCP requests over
//! stdio until the transport closes.

use std::path::Path;

use rmcp::transport::io::stdio;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use crate::application::indexing::repository_id_for;
use crate::domain::error::{Error, Result};
use crate::infrastructure::config::ConfigLoader;

use super::builder::{spawn_watcher, McpServerBuilder};
use super::mcp_server::McpServer;

/// Initialize structured logging to stderr (spec-recommended so stdout stays
/// reserved for the MCP transport).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();
}

/// Load configuration, build the server, and serve over stdio until the
/// client disconnects. The returned `Err` carries the distinct error kind
/// (`Configuration`, `Migration`, `Storage`, ...) `main` maps to a process
/// exit code per spec §6.
pub async fn run_server(config_path: Option<&Path>) -> Result<()> {
    init_tracing();

    let config = match config_path {
        Some(path) => ConfigLoader::new().load_with_file(path)?,
        None => ConfigLoader::new().load()?,
    };

    let root_path = std::env::current_dir()?;
    let repository_id = repository_id_for(&root_path)?;

    let components = McpServerBuilder::new()
        .with_config(config.clone())
        .with_root_path(root_path.clone())
        .build()
        .await?;

    let _watcher = spawn_watcher(components.watcher_service.clone(), &root_path, repository_id, &config)?;

    let server = McpServer::new(components.handler);
    let service = server.serve(stdio()).await.map_err(|e| Error::storage(e.to_string()))?;
    service.waiting().await.map_err(|e| Error::storage(e.to_string()))?;
    Ok(())
}
