//! # MCP Tool Server
//!
//! Exposes the `ToolRegistry` over MCP with an SSE transport. Every SSE connection
//! gets its own handler instance; all of them share the same read-only registry.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::{ErrorData, RoleServer, ServerHandler};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::domain::types::{ToolCallResult, ToolDescriptor};
use crate::infrastructure::tools::registry::ToolRegistry;
use crate::strings::logs;

/// Paths the SSE transport listens on.
#[derive(Debug, Clone)]
pub struct SsePaths {
    pub sse: String,
    pub post: String,
}

impl Default for SsePaths {
    fn default() -> Self {
        Self {
            sse: "/sse".to_string(),
            post: "/message".to_string(),
        }
    }
}

/// Per-connection MCP handler.
#[derive(Clone)]
pub struct FsGateServer {
    registry: Arc<ToolRegistry>,
}

impl FsGateServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for FsGateServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Filesystem tools confined to a single workspace directory. \
                 All paths are relative to the workspace root."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self.registry.catalog().iter().map(to_mcp_tool).collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        let started = std::time::Instant::now();
        let result = self.registry.dispatch(&request.name, &arguments).await;
        tracing::info!(
            tool = %request.name,
            success = result.is_success(),
            elapsed = ?started.elapsed(),
            "tool call handled"
        );
        Ok(to_call_result(result))
    }
}

fn to_mcp_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name.clone(),
        descriptor.description.clone(),
        Arc::new(descriptor.input_schema()),
    )
}

/// Failures travel as error results, never mixed with a success payload.
fn to_call_result(result: ToolCallResult) -> CallToolResult {
    match result {
        ToolCallResult::Success(text) => CallToolResult::success(vec![Content::text(text)]),
        ToolCallResult::Failure(message) => CallToolResult::error(vec![Content::text(message)]),
    }
}

/// Serve the registry on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<ToolRegistry>,
    paths: SsePaths,
    shutdown: CancellationToken,
) -> Result<()> {
    let bind = listener
        .local_addr()
        .context("Failed to read listener address")?;

    let (sse_server, router) = SseServer::new(SseServerConfig {
        bind,
        sse_path: paths.sse.clone(),
        post_path: paths.post.clone(),
        ct: shutdown.clone(),
        sse_keep_alive: None,
    });
    sse_server.with_service(move || FsGateServer::new(registry.clone()));

    tracing::info!("{}", logs::server_listening(&bind.to_string(), &paths.sse));

    let token = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .context("Tool server failed")?;

    tracing::info!("{}", logs::SERVER_STOPPED);
    Ok(())
}
