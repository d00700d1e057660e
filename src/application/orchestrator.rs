//! # Orchestrator
//!
//! Drives one conversation with a tool-calling model. A turn goes
//! `AwaitingUser -> ModelTurn -> ToolRound? -> Responded`: the model sees the history and
//! the catalog, any tool calls it asks for are run in order through the gateway, and a
//! second model request without tools produces the final answer.
//!
//! Exactly one tool round happens per turn. Whatever the follow-up request returns is
//! treated as the final answer.

use std::sync::Arc;

use crate::domain::error::TurnError;
use crate::domain::traits::{ChatModel, ToolGateway};
use crate::domain::types::{
    ConversationEntry, ToolCallRequest, ToolDescriptor, ToolInvocation, TurnOutcome,
};
use crate::strings::logs;

/// Append-only conversation history, cleared only on request.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Call ids issued by the assistant that have no result entry yet.
    pub fn unanswered_calls(&self) -> Vec<&str> {
        let mut pending: Vec<&str> = Vec::new();
        for entry in &self.entries {
            match entry {
                ConversationEntry::Assistant { tool_calls, .. } => {
                    pending.extend(tool_calls.iter().map(|c| c.id.as_str()));
                }
                ConversationEntry::ToolResult { call_id, .. } => {
                    if let Some(pos) = pending.iter().position(|id| *id == call_id.as_str()) {
                        pending.remove(pos);
                    }
                }
                ConversationEntry::User(_) => {}
            }
        }
        pending
    }
}

/// Process-lifetime tool catalog, fetched on first use.
#[derive(Debug, Default)]
pub struct CatalogCache {
    tools: Option<Vec<ToolDescriptor>>,
}

impl CatalogCache {
    async fn ensure(&mut self, gateway: &dyn ToolGateway) -> Result<&[ToolDescriptor], TurnError> {
        if self.tools.is_none() {
            let tools = gateway.catalog().await.map_err(TurnError::Catalog)?;
            tracing::info!("{}", logs::catalog_fetched(tools.len()));
            self.tools = Some(tools);
        }
        Ok(self.tools.as_deref().unwrap_or_default())
    }
}

pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    gateway: Arc<dyn ToolGateway>,
    conversation: Conversation,
    catalog: CatalogCache,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ChatModel>, gateway: Arc<dyn ToolGateway>) -> Self {
        Self {
            model,
            gateway,
            conversation: Conversation::new(),
            catalog: CatalogCache::default(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    /// The cached catalog, fetched if this is the first use.
    pub async fn tools(&mut self) -> Result<&[ToolDescriptor], TurnError> {
        self.catalog.ensure(self.gateway.as_ref()).await
    }

    /// Run one user turn to its final answer.
    ///
    /// Tool failures never end the turn; they are handed to the model as tool output.
    /// Only the catalog fetch and the model requests can fail a turn.
    pub async fn chat(&mut self, message: &str) -> Result<TurnOutcome, TurnError> {
        self.conversation
            .push(ConversationEntry::User(message.to_string()));

        let catalog = self.catalog.ensure(self.gateway.as_ref()).await?;
        let reply = self
            .model
            .complete(self.conversation.entries(), Some(catalog))
            .await?;

        if reply.tool_calls.is_empty() {
            let answer = reply.text.unwrap_or_default();
            self.respond(&answer);
            return Ok(TurnOutcome {
                answer,
                calls: Vec::new(),
            });
        }

        let calls = self.run_tool_round(reply.text, reply.tool_calls).await;

        let follow_up = self.model.complete(self.conversation.entries(), None).await?;
        if !follow_up.tool_calls.is_empty() {
            tracing::warn!(
                ignored = follow_up.tool_calls.len(),
                "model requested tools after the tool round"
            );
        }
        let answer = follow_up.text.unwrap_or_default();
        self.respond(&answer);

        Ok(TurnOutcome { answer, calls })
    }

    async fn run_tool_round(
        &mut self,
        text: Option<String>,
        requests: Vec<ToolCallRequest>,
    ) -> Vec<ToolInvocation> {
        self.conversation.push(ConversationEntry::Assistant {
            text,
            tool_calls: requests.clone(),
        });

        let mut calls = Vec::with_capacity(requests.len());
        for request in requests {
            let started = std::time::Instant::now();
            let result = self.gateway.invoke(&request).await;
            tracing::info!(
                tool = %request.name,
                call_id = %request.id,
                success = result.is_success(),
                elapsed = ?started.elapsed(),
                "tool call finished"
            );

            calls.push(ToolInvocation {
                name: request.name,
                arguments: request.arguments,
            });
            self.conversation.push(ConversationEntry::ToolResult {
                call_id: request.id,
                result,
            });
        }
        calls
    }

    fn respond(&mut self, answer: &str) {
        self.conversation.push(ConversationEntry::Assistant {
            text: Some(answer.to_string()),
            tool_calls: Vec::new(),
        });
    }
}
