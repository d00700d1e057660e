//! # LLM Module
//!
//! Tool-calling chat client for OpenAI-compatible providers (OpenAI, Groq, xAI).
//!
//! ```rust,no_run
//! use fsgate::domain::config::AgentConfig;
//! use fsgate::infrastructure::llm::Client;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(&AgentConfig::default())?;
//! println!("Using {}", client.model());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod providers;

pub use client::Client;
pub use providers::{Provider, ProviderConfig};
