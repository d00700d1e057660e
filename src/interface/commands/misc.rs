//! # Miscellaneous Commands
//!
//! Handles `/status`, `/tools` and `/clear`, plus rendering of turn results.
//! Handlers return the text to print so the REPL owns all output.

use crate::application::orchestrator::Orchestrator;
use crate::domain::types::{ToolDescriptor, TurnOutcome};
use crate::infrastructure::mcp::connector::McpConnector;
use crate::strings::messages;

/// Probe the tool server. `None` means the host runs on the embedded registry.
pub async fn handle_status(connector: Option<&McpConnector>) -> String {
    match connector {
        None => messages::EMBEDDED_STATUS.to_string(),
        Some(connector) => {
            if connector.check_connection().await {
                messages::connected(connector.base_url())
            } else {
                messages::disconnected(connector.base_url())
            }
        }
    }
}

pub async fn handle_tools(orchestrator: &mut Orchestrator) -> String {
    match orchestrator.tools().await {
        Ok(tools) => format_catalog(tools),
        Err(err) => messages::turn_failed(&err.to_string()),
    }
}

pub fn handle_clear(orchestrator: &mut Orchestrator) -> String {
    orchestrator.clear_history();
    messages::HISTORY_CLEARED.to_string()
}

pub fn format_catalog(tools: &[ToolDescriptor]) -> String {
    let mut out = messages::tool_list_header(tools.len());
    for tool in tools {
        out.push('\n');
        out.push_str(&messages::tool_list_line(&tool.name, &tool.description));
    }
    out
}

/// Tool calls made during the turn, then the answer.
pub fn format_outcome(outcome: &TurnOutcome) -> String {
    let mut out = String::new();
    for call in &outcome.calls {
        let arguments = serde_json::Value::Object(call.arguments.clone()).to_string();
        out.push_str(&messages::tool_call_line(&call.name, &arguments));
        out.push('\n');
    }
    if !outcome.calls.is_empty() {
        out.push('\n');
    }
    out.push_str(&outcome.answer);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ParamSpec, ParamType, ToolInvocation};
    use serde_json::json;

    #[test]
    fn test_format_catalog() {
        let tools = vec![ToolDescriptor {
            name: "read_file".into(),
            description: "Read a file".into(),
            params: vec![ParamSpec::required("path", ParamType::String, "Path")],
        }];
        assert_eq!(
            format_catalog(&tools),
            "🔧 1 tools available:\n  • read_file: Read a file"
        );
    }

    #[test]
    fn test_format_outcome_lists_calls_first() {
        let outcome = TurnOutcome {
            answer: "There is one file: notes.txt".into(),
            calls: vec![ToolInvocation {
                name: "list_directory".into(),
                arguments: json!({ "path": "." }).as_object().cloned().unwrap(),
            }],
        };
        assert_eq!(
            format_outcome(&outcome),
            "  🔧 list_directory {\"path\":\".\"}\n\nThere is one file: notes.txt"
        );
    }

    #[test]
    fn test_format_outcome_without_calls() {
        let outcome = TurnOutcome {
            answer: "Hello!".into(),
            calls: Vec::new(),
        };
        assert_eq!(format_outcome(&outcome), "Hello!");
    }

    #[tokio::test]
    async fn test_status_embedded() {
        assert_eq!(handle_status(None).await, messages::EMBEDDED_STATUS);
    }
}
