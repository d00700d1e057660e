//! # Infrastructure Layer
//!
//! Concrete implementations of the domain seams: the filesystem tool set, the MCP
//! transport on both sides, and the language model client.

pub mod llm;
pub mod mcp;
pub mod tools;
