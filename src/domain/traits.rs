//! # Domain Traits
//!
//! Abstract interfaces for the two external collaborators of the orchestrator:
//! the language model and the tool gateway.
//! Allows for pluggable implementations in the Infrastructure layer.

use async_trait::async_trait;

use crate::domain::error::LlmError;
use crate::domain::types::{
    ConversationEntry, ModelReply, ToolCallRequest, ToolCallResult, ToolDescriptor,
};

/// Abstract interface for a tool-calling chat model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation, optionally with the tool catalog, and return the reply.
    /// `tools` is `None` on follow-up requests after a tool round.
    async fn complete(
        &self,
        history: &[ConversationEntry],
        tools: Option<&[ToolDescriptor]>,
    ) -> Result<ModelReply, LlmError>;
}

/// Abstract interface for whatever serves the tools (network endpoint or in-process registry)
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Fetch the tool catalog.
    async fn catalog(&self) -> anyhow::Result<Vec<ToolDescriptor>>;

    /// Invoke one tool. Every failure, including timeouts and transport errors,
    /// comes back as `ToolCallResult::Failure`.
    async fn invoke(&self, call: &ToolCallRequest) -> ToolCallResult;
}
