//! # Tool Server Entry Point
//!
//! Serves the filesystem tools over MCP/SSE, confined to one workspace directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use fsgate::application::logging;
use fsgate::domain::config::AppConfig;
use fsgate::infrastructure::mcp::server::{self, SsePaths};
use fsgate::infrastructure::tools::file_ops::FileOps;
use fsgate::infrastructure::tools::path_guard::PathGuard;
use fsgate::infrastructure::tools::registry::ToolRegistry;
use fsgate::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "fsgate-server")]
#[command(about = "MCP filesystem tool server", long_about = None)]
#[command(version)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Directory all tool operations are confined to (created if missing)
    #[arg(long)]
    workspace: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(workspace) = args.workspace {
        config.server.workspace = workspace;
    }

    let _guard = logging::init(&config.logging)?;
    match &config.source {
        Some(path) => tracing::info!("{}", logs::config_loaded(&path.display().to_string())),
        None => tracing::info!("{}", logs::CONFIG_DEFAULTS),
    }

    let guard = PathGuard::new(&config.server.workspace).with_context(|| {
        format!(
            "Failed to prepare workspace {}",
            config.server.workspace.display()
        )
    })?;
    tracing::info!("{}", logs::workspace_ready(&guard.root().display().to_string()));
    let registry = Arc::new(ToolRegistry::new(FileOps::new(guard)));

    let bind = config.server.bind_address();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("{}", logs::SHUTDOWN),
            Err(err) => tracing::error!("{}", logs::shutdown_fail(&err.to_string())),
        }
        signal_token.cancel();
    });

    let paths = SsePaths {
        sse: config.server.sse_path.clone(),
        post: config.server.post_path.clone(),
    };
    server::serve(listener, registry, paths, shutdown).await
}
