//! # MCP Module
//!
//! Model Context Protocol plumbing: the SSE tool server, single-use client sessions and
//! the host-side connector that turns them into a `ToolGateway`.

pub mod connector;
pub mod server;
pub mod session;
