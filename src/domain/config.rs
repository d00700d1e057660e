//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Every field has a default, so a missing file still yields a working setup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Tool server settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    #[serde(default = "default_sse_path")]
    pub sse_path: String,
    #[serde(default = "default_post_path")]
    pub post_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workspace: default_workspace(),
            sse_path: default_sse_path(),
            post_path: default_post_path(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// How the host reaches the tool server.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Base URL of the tool server; derived from `server` when unset.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect: u64,
    #[serde(default = "default_invoke_timeout")]
    pub invoke: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: default_connect_timeout(),
            invoke: default_invoke_timeout(),
            probe: default_probe_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect)
    }

    pub fn invoke(&self) -> Duration {
        Duration::from_secs(self.invoke)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe)
    }
}

/// Language model settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Optional log file; console logging is always on.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Env-filter directive used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_workspace() -> PathBuf {
    PathBuf::from("workspace")
}
fn default_sse_path() -> String {
    "/sse".to_string()
}
fn default_post_path() -> String {
    "/message".to_string()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_invoke_timeout() -> u64 {
    30
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4-turbo-preview".to_string()
}
fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

impl AppConfig {
    /// Load configuration from `path`, or from the first default location that exists.
    /// Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_locations().into_iter().find(|p| p.exists()),
        };
        let mut config = match &source {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.source = source;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `MCP_SERVER_HOST`, `MCP_SERVER_PORT` and `MCP_SERVER_URL`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MCP_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MCP_SERVER_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid MCP_SERVER_PORT: {port}"))?;
        }
        if let Some(url) = lookup("MCP_SERVER_URL") {
            self.gateway.url = Some(url);
        }
        Ok(())
    }

    /// Base URL of the tool server as seen from the host.
    pub fn gateway_url(&self) -> String {
        self.gateway
            .url
            .clone()
            .unwrap_or_else(|| self.server.base_url())
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("fsgate").join("config.yaml"));
    }
    locations
}
