//! Ollama provider implementation.
//!
//! Talks to a local Ollama server through its non-streaming `/api/chat`
//! endpoint (<https://github.com/ollama/ollama/blob/main/docs/api.md>).

use super::AIProvider;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama server address.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model for narrative summaries.
const DEFAULT_MODEL: &str = "llama3.2";

/// Environment variable overriding the server address.
pub const HOST_ENV: &str = "OLLAMA_HOST";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<Message>,
    #[serde(default)]
    error: Option<String>,
}

/// Configuration for the Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Model tag pulled into the local server (e.g. "llama3.2").
    pub model: String,
    /// Sampling temperature; `None` keeps the model's default.
    pub temperature: Option<f32>,
    /// Request timeout in seconds; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Server address without the `/api/chat` path.
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            timeout_secs: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OllamaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OllamaConfigBuilder {
        OllamaConfigBuilder::default()
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`OllamaConfig`].
#[derive(Default)]
pub struct OllamaConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OllamaConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration. An unset base URL falls back to
    /// `OLLAMA_HOST`, then to the local default. Addresses without a scheme
    /// (`127.0.0.1:11434`, as Ollama itself accepts) get `http://`.
    pub fn build(self) -> OllamaConfig {
        let base_url = self
            .base_url
            .or_else(|| std::env::var(HOST_ENV).ok())
            .filter(|host| !host.trim().is_empty())
            .map(|host| with_scheme(host.trim()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        OllamaConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
            base_url,
        }
    }
}

fn with_scheme(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// Local Ollama provider.
///
/// ```rust,ignore
/// use lex_explore::ai::{OllamaConfig, OllamaProvider};
///
/// let provider = OllamaProvider::with_config(
///     OllamaConfig::builder().model("mistral").build(),
/// )?;
/// ```
pub struct OllamaProvider {
    config: OllamaConfig,
    client: Client,
}

impl OllamaProvider {
    /// Create a provider for `llama3.2` on the local server.
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| ChatOptions { temperature }),
        }
    }
}

impl AIProvider for OllamaProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.config.chat_url();
        debug!("Calling Ollama at {} with model {}", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Ollama API Error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: ChatResponse = response.json()?;
        if let Some(error) = result.error {
            return Err(anyhow!("Ollama error: {}", error));
        }
        result
            .message
            .map(|msg| msg.content)
            .ok_or_else(|| anyhow!("No message in Ollama response"))
    }

    fn name(&self) -> &str {
        "Ollama"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}
