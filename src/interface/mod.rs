//! # Interface Layer
//!
//! The operator-facing surface of the host: an interactive REPL and its slash commands.

pub mod commands;
pub mod repl;
