// Standalone MCP server binary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use usaspending_mcp::{Dispatcher, McpServer, ServerConfig, ToolRegistry};

#[derive(Parser, Debug)]
#[command(name = "usaspending-mcp")]
#[command(about = "MCP server for read-only USAspending.gov queries", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "USASPENDING_MCP_CONFIG", default_value = "usaspending-mcp.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "usaspending_mcp=info,usaspending_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("USAspending MCP Server starting...");

    let config = ServerConfig::load(&args.config)?;
    let client = config.build_client()?;
    tracing::info!(upstream = %client.config().base_url, "Using upstream API");

    let registry = Arc::new(ToolRegistry::usaspending());
    tracing::info!("Registered {} tools", registry.len());

    let dispatcher = Dispatcher::new(registry, client);
    let server = Arc::new(McpServer::with_name(dispatcher, config.server.name.clone()));
    server.start().await?;

    Ok(())
}
