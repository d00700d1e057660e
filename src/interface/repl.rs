//! # REPL
//!
//! Line-oriented chat loop on stdin/stdout. Turns are processed strictly one at a time;
//! the orchestrator is owned here and never shared.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::orchestrator::Orchestrator;
use crate::infrastructure::mcp::connector::McpConnector;
use crate::interface::commands::{Command, misc};
use crate::strings::{help, logs, messages};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    orchestrator: Orchestrator,
    /// `None` when tools come from the embedded registry.
    connector: Option<Arc<McpConnector>>,
}

impl Repl {
    pub fn new(orchestrator: Orchestrator, connector: Option<Arc<McpConnector>>) -> Self {
        Self {
            orchestrator,
            connector,
        }
    }

    /// Handle one input line and return the text to print.
    pub async fn handle_line(&mut self, line: &str) -> (Flow, String) {
        let line = line.trim();
        if line.is_empty() {
            return (Flow::Continue, String::new());
        }

        let Some(command) = Command::parse(line) else {
            let output = match self.orchestrator.chat(line).await {
                Ok(outcome) => misc::format_outcome(&outcome),
                Err(err) => {
                    tracing::error!(error = %err, "turn failed");
                    messages::turn_failed(&err.to_string())
                }
            };
            return (Flow::Continue, output);
        };

        tracing::debug!(?command, "slash command");
        match command {
            Command::Help => (Flow::Continue, help::MAIN.trim_end().to_string()),
            Command::Clear => (Flow::Continue, misc::handle_clear(&mut self.orchestrator)),
            Command::Tools => (
                Flow::Continue,
                misc::handle_tools(&mut self.orchestrator).await,
            ),
            Command::Status => (
                Flow::Continue,
                misc::handle_status(self.connector.as_deref()).await,
            ),
            Command::Quit => (Flow::Quit, messages::GOODBYE.to_string()),
            Command::Unknown(name) => (Flow::Continue, messages::unknown_command(&name)),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!("{}", messages::WELCOME);
        println!("{}", misc::handle_status(self.connector.as_deref()).await);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{}", messages::PROMPT);
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                signal = tokio::signal::ctrl_c() => {
                    if let Err(err) = signal {
                        tracing::warn!("{}", logs::shutdown_fail(&err.to_string()));
                    }
                    println!();
                    break;
                }
            };
            // EOF
            let Some(line) = line else {
                println!();
                break;
            };

            let (flow, output) = self.handle_line(&line).await;
            if !output.is_empty() {
                println!("{output}\n");
            }
            if flow == Flow::Quit {
                break;
            }
        }

        tracing::info!("{}", logs::SHUTDOWN);
        Ok(())
    }
}
