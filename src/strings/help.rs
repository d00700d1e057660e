//! # Help Text
//!
//! Shown by the REPL's `/help` command.

pub const MAIN: &str = concat!(
    "Ask for anything you want done in the workspace, e.g.\n",
    "  List all files in the workspace\n",
    "  Create a file called notes.txt with my shopping list\n",
    "\n",
    "Commands:\n",
    "  /tools   List available tools\n",
    "  /status  Check the tool server connection\n",
    "  /clear   Forget the conversation so far\n",
    "  /help    Show this help\n",
    "  /quit    Exit\n",
);
