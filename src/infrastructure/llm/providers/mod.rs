//! # LLM Providers
//!
//! Every supported provider speaks the OpenAI chat-completions dialect; they differ only
//! in their default base URL.

pub(crate) mod openai;

use crate::domain::config::AgentConfig;
use crate::domain::error::LlmError;

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Groq,
    XAI,
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
            Provider::XAI => "xai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "groq" => Some(Provider::Groq),
            "xai" | "grok" => Some(Provider::XAI),
            _ => None,
        }
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::XAI => "https://api.x.ai/v1",
        }
    }
}

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: String,
    pub model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
    pub temperature: Option<f32>,
}

impl ProviderConfig {
    pub fn from_agent_config(config: &AgentConfig, provider: Provider) -> Result<Self, LlmError> {
        Self::from_agent_config_with(config, provider, |key| std::env::var(key).ok())
    }

    /// Like `from_agent_config`, reading the API key variable through `lookup`.
    pub fn from_agent_config_with<F>(
        config: &AgentConfig,
        provider: Provider,
        lookup: F,
    ) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = if let Some(key) = &config.api_key {
            key.clone()
        } else if let Some(env_var) = &config.api_key_env {
            lookup(env_var).ok_or_else(|| {
                LlmError::new(
                    provider.as_str(),
                    format!("API key env var {env_var} not set"),
                )
            })?
        } else {
            return Err(LlmError::new(
                provider.as_str(),
                "No API key provided - set api_key or api_key_env",
            ));
        };

        Ok(Self {
            api_key,
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            model: config.model.clone(),
            timeout: config.timeout,
            temperature: config.temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from_str("openai"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str("OpenAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str("groq"), Some(Provider::Groq));
        assert_eq!(Provider::from_str("xai"), Some(Provider::XAI));
        assert_eq!(Provider::from_str("anthropic"), None);
    }

    #[test]
    fn test_provider_as_str() {
        assert_eq!(Provider::OpenAI.as_str(), "openai");
        assert_eq!(Provider::Groq.as_str(), "groq");
        assert_eq!(Provider::XAI.as_str(), "xai");
    }

    #[test]
    fn test_key_from_env_lookup() {
        let config = AgentConfig::default();
        let resolved = ProviderConfig::from_agent_config_with(&config, Provider::Groq, |key| {
            (key == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap();
        assert_eq!(resolved.api_key, "sk-test");
        assert_eq!(resolved.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(resolved.model, "gpt-4-turbo-preview");
    }

    #[test]
    fn test_explicit_key_and_endpoint_win() {
        let config = AgentConfig {
            api_key: Some("sk-inline".into()),
            endpoint: Some("http://localhost:11434/v1".into()),
            ..AgentConfig::default()
        };
        let resolved =
            ProviderConfig::from_agent_config_with(&config, Provider::OpenAI, |_| None).unwrap();
        assert_eq!(resolved.api_key, "sk-inline");
        assert_eq!(resolved.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_missing_key_is_error() {
        let config = AgentConfig::default();
        let err = ProviderConfig::from_agent_config_with(&config, Provider::OpenAI, |_| None)
            .err()
            .unwrap();
        assert_eq!(err.provider, "openai");
        assert!(err.message.contains("OPENAI_API_KEY"));
    }
}
