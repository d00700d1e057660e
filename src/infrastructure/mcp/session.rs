//! # Tool Session
//!
//! One MCP client session per tool call. A session walks
//! `Idle -> Connecting -> Invoking -> Closing -> Done` exactly once and is consumed by
//! the call, so no transport is ever shared between two invocations.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use rmcp::model::{CallToolRequestParam, CallToolResult, Tool};
use rmcp::service::{ClientInitializeError, RunningService};
use rmcp::transport::SseClientTransport;
use rmcp::{Peer, RoleClient, ServiceError, ServiceExt};
use tokio::time::timeout;

use crate::domain::types::{Arguments, ToolCallResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Invoking,
    Closing,
    Done,
}

/// Which bounded phase of a session ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Invoke,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Connect => "connect",
            Phase::Invoke => "invoke",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    pub connect: Duration,
    pub invoke: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            invoke: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    Timeout { phase: Phase, after: Duration },
    /// The endpoint could not be reached or dropped the connection.
    Transport(String),
    /// The endpoint answered with something other than a tool result.
    Protocol(String),
}

impl SessionError {
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Timeout { phase, after } => {
                write!(f, "{} timed out after {after:?}", phase.as_str())
            }
            SessionError::Transport(msg) => write!(f, "connection failed: {msg}"),
            SessionError::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ClientInitializeError> for SessionError {
    fn from(err: ClientInitializeError) -> Self {
        match err {
            ClientInitializeError::ConnectionClosed(_)
            | ClientInitializeError::TransportError { .. }
            | ClientInitializeError::Cancelled => SessionError::Transport(err.to_string()),
            _ => SessionError::Protocol(err.to_string()),
        }
    }
}

impl From<ServiceError> for SessionError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::TransportSend(_)
            | ServiceError::TransportClosed
            | ServiceError::Cancelled { .. } => SessionError::Transport(err.to_string()),
            ServiceError::Timeout { timeout } => SessionError::Timeout {
                phase: Phase::Invoke,
                after: timeout,
            },
            _ => SessionError::Protocol(err.to_string()),
        }
    }
}

type Client = RunningService<RoleClient, ()>;

/// A single-use MCP client session against an SSE endpoint.
pub struct ToolSession {
    sse_url: String,
    timeouts: SessionTimeouts,
    state: SessionState,
}

impl ToolSession {
    pub fn new(sse_url: impl Into<String>, timeouts: SessionTimeouts) -> Self {
        Self {
            sse_url: sse_url.into(),
            timeouts,
            state: SessionState::Idle,
        }
    }

    /// Invoke one tool. Tool-level failures come back as `Ok(Failure)`.
    pub async fn call_tool(
        self,
        name: &str,
        arguments: Arguments,
    ) -> Result<ToolCallResult, SessionError> {
        let request = CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(arguments),
        };
        let result = self
            .run(move |peer| async move { peer.call_tool(request).await })
            .await?;
        Ok(to_tool_result(result))
    }

    /// Fetch the advertised tool list.
    pub async fn list_tools(self) -> Result<Vec<Tool>, SessionError> {
        self.run(|peer| async move { peer.list_all_tools().await })
            .await
    }

    async fn run<T, F, Fut>(mut self, op: F) -> Result<T, SessionError>
    where
        F: FnOnce(Peer<RoleClient>) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let client = self.connect().await?;

        self.transition(SessionState::Invoking);
        let started = Instant::now();
        let outcome = match timeout(self.timeouts.invoke, op(client.peer().clone())).await {
            Ok(result) => result.map_err(SessionError::from),
            Err(_) => Err(SessionError::Timeout {
                phase: Phase::Invoke,
                after: self.timeouts.invoke,
            }),
        };
        tracing::debug!(elapsed = ?started.elapsed(), ok = outcome.is_ok(), "invoke finished");

        self.close(client).await;
        outcome
    }

    async fn connect(&mut self) -> Result<Client, SessionError> {
        self.transition(SessionState::Connecting);
        let url = self.sse_url.clone();
        let connecting = async move {
            let transport = SseClientTransport::start(url)
                .await
                .map_err(|e| SessionError::Transport(e.to_string()))?;
            let client = ().serve(transport).await?;
            Ok::<_, SessionError>(client)
        };

        let result = match timeout(self.timeouts.connect, connecting).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout {
                phase: Phase::Connect,
                after: self.timeouts.connect,
            }),
        };
        if let Err(err) = &result {
            tracing::warn!(url = %self.sse_url, error = %err, "tool session connect failed");
            self.transition(SessionState::Done);
        }
        result
    }

    async fn close(&mut self, client: Client) {
        self.transition(SessionState::Closing);
        if let Err(err) = client.cancel().await {
            tracing::warn!(error = %err, "tool session close failed");
        }
        self.transition(SessionState::Done);
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "tool session state");
        self.state = next;
    }
}

/// Error results become `Failure`; otherwise the first text block wins.
fn to_tool_result(result: CallToolResult) -> ToolCallResult {
    let text = result
        .content
        .iter()
        .find_map(|c| c.as_text().map(|t| t.text.clone()))
        .or_else(|| result.structured_content.as_ref().map(|v| v.to_string()))
        .unwrap_or_else(|| serde_json::to_string(&result.content).unwrap_or_default());

    if result.is_error.unwrap_or(false) {
        ToolCallResult::Failure(text)
    } else {
        ToolCallResult::Success(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serde_json::json;

    #[test]
    fn test_error_result_maps_to_failure() {
        let result = CallToolResult::error(vec![Content::text("❌ Error: 'a.txt' does not exist")]);
        assert_eq!(
            to_tool_result(result),
            ToolCallResult::failure("❌ Error: 'a.txt' does not exist")
        );
    }

    #[test]
    fn test_first_text_block_wins() {
        let result = CallToolResult::success(vec![Content::text("one"), Content::text("two")]);
        assert_eq!(to_tool_result(result), ToolCallResult::Success("one".into()));
    }

    #[test]
    fn test_structured_fallback() {
        let result = CallToolResult {
            content: Vec::new(),
            structured_content: Some(json!({ "n": 1 })),
            is_error: None,
            meta: None,
        };
        assert_eq!(to_tool_result(result), ToolCallResult::Success(r#"{"n":1}"#.into()));
    }

    #[test]
    fn test_timeout_message() {
        let err = SessionError::Timeout {
            phase: Phase::Connect,
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "connect timed out after 5s");
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let session = ToolSession::new(format!("http://{addr}/sse"), SessionTimeouts::default());
        let err = session.list_tools().await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }
}
