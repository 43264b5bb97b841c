use clap::Parser;
use codeindex_mcp::run_server;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "codeindex-mcp")]
#[command(about = "Local-first code indexing and retrieval engine exposed over MCP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_server(cli.config.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server exited with an error");
            ExitCode::from(err.exit_code())
        }
    }
}
