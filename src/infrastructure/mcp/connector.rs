//! # MCP Connector
//!
//! Host-side view of a remote tool server: endpoint discovery, a liveness probe and a
//! `ToolGateway` that opens a fresh `ToolSession` for every request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::traits::ToolGateway;
use crate::domain::types::{ToolCallRequest, ToolCallResult, ToolDescriptor};
use crate::infrastructure::mcp::session::{SessionTimeouts, ToolSession};
use crate::strings::logs;

pub struct McpConnector {
    base_url: String,
    sse_path: String,
    timeouts: SessionTimeouts,
    probe_timeout: Duration,
    http: reqwest::Client,
    connected: AtomicBool,
}

impl McpConnector {
    pub fn new(
        base_url: impl Into<String>,
        sse_path: impl Into<String>,
        timeouts: SessionTimeouts,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            sse_path: sse_path.into(),
            timeouts,
            probe_timeout,
            http: reqwest::Client::new(),
            connected: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let timeouts = &config.gateway.timeouts;
        Self::new(
            config.gateway_url(),
            config.server.sse_path.clone(),
            SessionTimeouts {
                connect: timeouts.connect(),
                invoke: timeouts.invoke(),
            },
            timeouts.probe(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Streaming endpoint: base URL plus the well-known SSE path.
    pub fn sse_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.sse_path.starts_with('/') {
            format!("{base}{}", self.sse_path)
        } else {
            format!("{base}/{}", self.sse_path)
        }
    }

    /// Last known connectivity, as of the latest probe or call.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// GET the streaming endpoint; a 200 means the server is up.
    pub async fn check_connection(&self) -> bool {
        let reachable = match self
            .http
            .get(self.sse_url())
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(err) => {
                tracing::debug!(error = %err, "liveness probe failed");
                false
            }
        };
        self.connected.store(reachable, Ordering::Relaxed);
        reachable
    }

    async fn ensure_connected(&self) -> bool {
        self.is_connected() || self.check_connection().await
    }

    fn session(&self) -> ToolSession {
        ToolSession::new(self.sse_url(), self.timeouts)
    }
}

#[async_trait]
impl ToolGateway for McpConnector {
    async fn catalog(&self) -> Result<Vec<ToolDescriptor>> {
        if !self.ensure_connected().await {
            return Err(anyhow!(logs::server_unreachable(&self.base_url)));
        }
        let tools = self.session().list_tools().await.map_err(|err| {
            if err.is_transport() {
                self.connected.store(false, Ordering::Relaxed);
            }
            anyhow!(err)
        })?;

        Ok(tools
            .iter()
            .map(|tool| {
                ToolDescriptor::from_schema(
                    &tool.name,
                    tool.description.as_deref().unwrap_or_default(),
                    &tool.input_schema,
                )
            })
            .collect())
    }

    async fn invoke(&self, call: &ToolCallRequest) -> ToolCallResult {
        if !self.ensure_connected().await {
            return ToolCallResult::failure(logs::server_unreachable(&self.base_url));
        }

        tracing::info!(tool = %call.name, call_id = %call.id, "dispatching tool call");
        match self
            .session()
            .call_tool(&call.name, call.arguments.clone())
            .await
        {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(tool = %call.name, error = %err, "tool call failed");
                if err.is_transport() {
                    self.connected.store(false, Ordering::Relaxed);
                }
                ToolCallResult::failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(base: &str, sse: &str) -> McpConnector {
        McpConnector::new(
            base,
            sse,
            SessionTimeouts::default(),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_sse_url_joining() {
        assert_eq!(
            connector("http://localhost:8000", "/sse").sse_url(),
            "http://localhost:8000/sse"
        );
        assert_eq!(
            connector("http://localhost:8000/", "sse").sse_url(),
            "http://localhost:8000/sse"
        );
    }

    #[test]
    fn test_from_config_uses_gateway_url() {
        let mut config = AppConfig::default();
        config.gateway.url = Some("http://tools.internal:9000".into());
        let connector = McpConnector::from_config(&config);
        assert_eq!(connector.sse_url(), "http://tools.internal:9000/sse");
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_call() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let connector = connector(&format!("http://{addr}"), "/sse");
        assert!(!connector.check_connection().await);

        let call = ToolCallRequest {
            id: "call_1".into(),
            name: "read_file".into(),
            arguments: Default::default(),
        };
        let result = connector.invoke(&call).await;
        assert!(!result.is_success());
        assert!(connector.catalog().await.is_err());
    }
}
