//! # Slash Commands
//!
//! Input starting with `/` is a command for the host itself; everything else goes to the
//! model.

pub mod misc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Tools,
    Status,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` when the line is a chat message.
    pub fn parse(line: &str) -> Option<Command> {
        let rest = line.trim().strip_prefix('/')?;
        let name = rest.split_whitespace().next().unwrap_or_default();
        let command = match name.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "clear" | "reset" => Command::Clear,
            "tools" => Command::Tools,
            "status" => Command::Status,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(name.to_string()),
        };
        Some(command)
    }
}
