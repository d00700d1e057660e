//! # Messages
//!
//! User-facing text printed by the host REPL and subcommands.

pub const WELCOME: &str = "🗂️ Filesystem Assistant. Type /help for commands, /quit to exit.";
pub const PROMPT: &str = "> ";
pub const GOODBYE: &str = "Bye.";
pub const HISTORY_CLEARED: &str = "🧹 Conversation cleared.";
pub const EMBEDDED_STATUS: &str = "🟢 Using the embedded tool registry (no server needed).";

pub fn unknown_command(name: &str) -> String {
    format!("❓ Unknown command: /{name}. Type /help for the list.")
}

pub fn connected(url: &str) -> String {
    format!("🟢 Connected to tool server at {url}")
}

pub fn disconnected(url: &str) -> String {
    format!(
        "🔴 Not connected to tool server at {url}\nStart it with: fsgate-server --workspace <dir>"
    )
}

pub fn tool_list_header(count: usize) -> String {
    format!("🔧 {count} tools available:")
}

pub fn tool_list_line(name: &str, description: &str) -> String {
    format!("  • {name}: {description}")
}

pub fn tool_call_line(name: &str, arguments: &str) -> String {
    format!("  🔧 {name} {arguments}")
}

pub fn turn_failed(err: &str) -> String {
    format!("❌ {err}")
}

pub fn invalid_arguments(err: &str) -> String {
    format!("Tool arguments must be a JSON object: {err}")
}
