//! # LLM Client
//!
//! Provides the `Client` struct, the `ChatModel` used by the orchestrator.
//! It resolves the provider and credentials from the agent configuration once and reuses
//! a single HTTP client for every request.

use async_trait::async_trait;

use crate::domain::config::AgentConfig;
use crate::domain::error::LlmError;
use crate::domain::traits::ChatModel;
use crate::domain::types::{ConversationEntry, ModelReply, ToolDescriptor};
use crate::infrastructure::llm::providers::{self, Provider, ProviderConfig};

/// Tool-calling chat client for one configured provider and model
pub struct Client {
    provider: Provider,
    config: ProviderConfig,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client from the agent configuration
    pub fn new(agent: &AgentConfig) -> Result<Self, LlmError> {
        let provider = Provider::from_str(&agent.provider)
            .ok_or_else(|| LlmError::new(&agent.provider, "Unknown provider"))?;
        let config = ProviderConfig::from_agent_config(agent, provider)?;
        Self::with_config(provider, config)
    }

    pub fn with_config(provider: Provider, config: ProviderConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| {
                LlmError::new(provider.as_str(), format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            provider,
            config,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Override the configured model.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }
}

#[async_trait]
impl ChatModel for Client {
    async fn complete(
        &self,
        history: &[ConversationEntry],
        tools: Option<&[ToolDescriptor]>,
    ) -> Result<ModelReply, LlmError> {
        tracing::debug!(
            provider = self.provider.as_str(),
            model = %self.config.model,
            messages = history.len(),
            with_tools = tools.is_some(),
            "sending chat completion"
        );
        providers::openai::chat(&self.http, self.provider, &self.config, history, tools).await
    }
}
