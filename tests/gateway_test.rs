use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use fsgate::domain::traits::ToolGateway;
use fsgate::domain::types::{Arguments, ToolCallRequest, ToolCallResult};
use fsgate::infrastructure::mcp::connector::McpConnector;
use fsgate::infrastructure::mcp::server::{self, SsePaths};
use fsgate::infrastructure::mcp::session::{Phase, SessionError, SessionTimeouts, ToolSession};
use fsgate::infrastructure::tools::file_ops::FileOps;
use fsgate::infrastructure::tools::path_guard::PathGuard;
use fsgate::infrastructure::tools::registry::ToolRegistry;

struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    _workspace: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let workspace = TempDir::new().unwrap();
        let registry = Arc::new(ToolRegistry::new(FileOps::new(
            PathGuard::new(workspace.path()).unwrap(),
        )));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();

        tokio::spawn(server::serve(
            listener,
            registry,
            SsePaths::default(),
            shutdown.clone(),
        ));

        Self {
            addr,
            shutdown,
            _workspace: workspace,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn connector(&self) -> McpConnector {
        McpConnector::new(
            self.base_url(),
            "/sse",
            SessionTimeouts::default(),
            Duration::from_secs(5),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn args(value: Value) -> Arguments {
    value.as_object().cloned().unwrap()
}

fn call(name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args(arguments),
    }
}

#[tokio::test]
async fn test_probe_and_catalog() {
    let server = TestServer::start().await;
    let connector = server.connector();

    assert!(connector.check_connection().await);
    assert!(connector.is_connected());

    let catalog = connector.catalog().await.unwrap();
    let mut names: Vec<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "append_file",
            "create_directory",
            "delete_file",
            "get_file_info",
            "list_directory",
            "move_file",
            "read_file",
            "write_file",
        ]
    );

    let write = catalog.iter().find(|t| t.name == "write_file").unwrap();
    let required: Vec<&str> = write
        .params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(required.len(), 2);
    assert!(required.contains(&"path") && required.contains(&"content"));
}

#[tokio::test]
async fn test_write_then_read_over_sse() {
    let server = TestServer::start().await;
    let connector = server.connector();

    let written = connector
        .invoke(&call(
            "write_file",
            json!({ "path": "hello.txt", "content": "Hello from MCP!" }),
        ))
        .await;
    assert!(written.is_success(), "{written:?}");

    let read = connector
        .invoke(&call("read_file", json!({ "path": "hello.txt" })))
        .await;
    assert!(read.is_success());
    assert!(read.text().contains("Hello from MCP!"));
}

#[tokio::test]
async fn test_tool_failures_cross_the_wire() {
    let server = TestServer::start().await;
    let connector = server.connector();

    let missing = connector
        .invoke(&call("read_file", json!({ "path": "nope.txt" })))
        .await;
    assert!(matches!(missing, ToolCallResult::Failure(ref m) if m.contains("does not exist")));

    let escape = connector
        .invoke(&call("read_file", json!({ "path": "../../etc/passwd" })))
        .await;
    assert!(matches!(escape, ToolCallResult::Failure(ref m) if m.contains("Path traversal")));

    let unknown = connector.invoke(&call("format_disk", json!({}))).await;
    assert!(!unknown.is_success());

    // tool failures are not connectivity problems
    assert!(connector.is_connected());
}

#[tokio::test]
async fn test_each_session_is_single_use() {
    let server = TestServer::start().await;
    let sse_url = format!("{}/sse", server.base_url());

    for i in 0..3 {
        let result = ToolSession::new(&sse_url, SessionTimeouts::default())
            .call_tool(
                "write_file",
                args(json!({ "path": format!("f{i}.txt"), "content": "x" })),
            )
            .await
            .unwrap();
        assert!(result.is_success());
    }

    let listing = ToolSession::new(&sse_url, SessionTimeouts::default())
        .call_tool("list_directory", Arguments::new())
        .await
        .unwrap();
    for i in 0..3 {
        assert!(listing.text().contains(&format!("f{i}.txt")));
    }
}

#[tokio::test]
async fn test_connect_timeout_against_silent_endpoint() {
    // Accepts TCP connections but never answers.
    let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();

    let timeouts = SessionTimeouts {
        connect: Duration::from_millis(300),
        invoke: Duration::from_secs(30),
    };
    let started = std::time::Instant::now();
    let err = ToolSession::new(format!("http://{addr}/sse"), timeouts)
        .call_tool("read_file", args(json!({ "path": "hello.txt" })))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Timeout {
            phase: Phase::Connect,
            ..
        }
    ));
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// Answers `slow` only after `delay`; every other tool answers at once.
#[derive(Clone)]
struct SlowServer {
    delay: Duration,
}

impl ServerHandler for SlowServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        if request.name == "slow" {
            tokio::time::sleep(self.delay).await;
        }
        Ok(CallToolResult::success(vec![Content::text(format!(
            "{} done",
            request.name
        ))]))
    }
}

async fn start_slow_server(delay: Duration) -> (SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let (sse_server, router) = SseServer::new(SseServerConfig {
        bind: addr,
        sse_path: "/sse".to_string(),
        post_path: "/message".to_string(),
        ct: shutdown.clone(),
        sse_keep_alive: None,
    });
    sse_server.with_service(move || SlowServer { delay });

    let token = shutdown.clone();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    });
    (addr, shutdown)
}

#[tokio::test]
async fn test_invoke_timeout_leaves_server_usable() {
    let (addr, shutdown) = start_slow_server(Duration::from_secs(5)).await;
    let sse_url = format!("http://{addr}/sse");

    let timeouts = SessionTimeouts {
        connect: Duration::from_secs(5),
        invoke: Duration::from_millis(300),
    };
    let started = std::time::Instant::now();
    let err = ToolSession::new(&sse_url, timeouts)
        .call_tool("slow", Arguments::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Timeout {
            phase: Phase::Invoke,
            ..
        }
    ));
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(5));

    // The timed-out session was closed; a fresh one gets through.
    let result = ToolSession::new(&sse_url, timeouts)
        .call_tool("fast", Arguments::new())
        .await
        .unwrap();
    assert_eq!(result, ToolCallResult::Success("fast done".to_string()));

    shutdown.cancel();
}
