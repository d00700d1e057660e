//! # fsgate
//!
//! A sandboxed filesystem tool gateway served over MCP, and a host that lets a
//! tool-calling language model drive it.
//!
//! - Domain: configuration, data model, seams and errors
//! - Infrastructure: path guard, file operations, tool registry, MCP transport, LLM client
//! - Application: the orchestrator and logging setup
//! - Interface: the host REPL

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
