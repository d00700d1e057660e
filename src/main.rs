//! # Host Entry Point
//!
//! Runs the chat REPL against a tool server (or the embedded registry), and offers a few
//! operator subcommands that talk to the gateway directly.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use fsgate::application::logging;
use fsgate::application::orchestrator::Orchestrator;
use fsgate::domain::config::AppConfig;
use fsgate::domain::traits::ToolGateway;
use fsgate::domain::types::{Arguments, ToolCallRequest, ToolCallResult};
use fsgate::infrastructure::llm::Client as LlmClient;
use fsgate::infrastructure::mcp::connector::McpConnector;
use fsgate::infrastructure::tools::file_ops::FileOps;
use fsgate::infrastructure::tools::path_guard::PathGuard;
use fsgate::infrastructure::tools::registry::ToolRegistry;
use fsgate::interface::commands::misc;
use fsgate::interface::repl::Repl;
use fsgate::strings::{logs, messages};

#[derive(Parser)]
#[command(name = "fsgate")]
#[command(about = "Chat with a language model that manages files in a sandboxed workspace", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to data/config.yaml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tool server base URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Model to use instead of the configured one
    #[arg(long, global = true)]
    model: Option<String>,

    /// Use the in-process tool registry on the configured workspace instead of a server
    #[arg(long, global = true)]
    embedded: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Check whether the tool server is reachable
    Status,
    /// List the tools the gateway offers
    Tools,
    /// Invoke one tool directly, bypassing the model
    Call {
        tool: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.gateway.url = Some(url);
    }

    let _guard = logging::init(&config.logging)?;
    match &config.source {
        Some(path) => tracing::info!("{}", logs::config_loaded(&path.display().to_string())),
        None => tracing::info!("{}", logs::CONFIG_DEFAULTS),
    }

    let connector = (!cli.embedded).then(|| Arc::new(McpConnector::from_config(&config)));
    let gateway: Arc<dyn ToolGateway> = match &connector {
        Some(connector) => connector.clone(),
        None => Arc::new(embedded_registry(&config)?),
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let mut client = LlmClient::new(&config.agent)?;
            if let Some(model) = cli.model {
                client.set_model(model);
            }
            tracing::info!(
                "{}",
                logs::host_ready(
                    client.model(),
                    connector.as_ref().map_or("embedded registry", |c| c.base_url())
                )
            );
            let orchestrator = Orchestrator::new(Arc::new(client), gateway);
            Repl::new(orchestrator, connector).run().await
        }
        Commands::Status => {
            println!("{}", misc::handle_status(connector.as_deref()).await);
            Ok(())
        }
        Commands::Tools => {
            let tools = gateway.catalog().await?;
            println!("{}", misc::format_catalog(&tools));
            Ok(())
        }
        Commands::Call { tool, arguments } => {
            let arguments: Arguments = serde_json::from_str(&arguments)
                .map_err(|e| anyhow::anyhow!(messages::invalid_arguments(&e.to_string())))?;
            let call = ToolCallRequest {
                id: "cli".to_string(),
                name: tool,
                arguments,
            };
            match gateway.invoke(&call).await {
                ToolCallResult::Success(text) => {
                    println!("{text}");
                    Ok(())
                }
                ToolCallResult::Failure(message) => bail!(message),
            }
        }
    }
}

fn embedded_registry(config: &AppConfig) -> Result<ToolRegistry> {
    let guard = PathGuard::new(&config.server.workspace).with_context(|| {
        format!(
            "Failed to prepare workspace {}",
            config.server.workspace.display()
        )
    })?;
    tracing::info!("{}", logs::workspace_ready(&guard.root().display().to_string()));
    Ok(ToolRegistry::new(FileOps::new(guard)))
}
