//! # Log Strings
//!
//! Messages written through `tracing` by the binaries and the MCP layer.

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub const CONFIG_DEFAULTS: &str = "No configuration file found, using defaults";

pub fn workspace_ready(root: &str) -> String {
    format!("Workspace root: {root}")
}

pub fn server_listening(addr: &str, sse_path: &str) -> String {
    format!("Tool server listening on http://{addr}{sse_path}")
}

pub const SERVER_STOPPED: &str = "Tool server stopped";

pub const SHUTDOWN: &str = "Shutting down...";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn server_unreachable(url: &str) -> String {
    format!("Tool server is not reachable at {url}")
}

pub fn catalog_fetched(count: usize) -> String {
    format!("Fetched tool catalog ({count} tools)")
}

pub fn host_ready(model: &str, gateway: &str) -> String {
    format!("Host ready: model={model}, tools via {gateway}")
}
