//! OpenRouter provider implementation.
//!
//! This module provides the [`OpenRouterProvider`] which implements the
//! [`AIProvider`] trait for the OpenRouter chat completions API
//! (<https://openrouter.ai/>).

use super::AIProvider;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenRouter API endpoint.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for narrative summaries.
const DEFAULT_MODEL: &str = "meta-llama/llama-3.2-3b-instruct";

/// Default temperature for model responses.
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default max tokens for responses.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

impl OpenRouterResponse {
    fn into_text(self) -> Option<String> {
        self.choices?
            .into_iter()
            .next()?
            .message
            .map(|msg| msg.content)
    }
}

/// Configuration for the OpenRouter provider.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// The model to use (e.g., "meta-llama/llama-3.2-3b-instruct", "openai/gpt-4o").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }
}

/// Builder for [`OpenRouterConfig`].
#[derive(Default)]
pub struct OpenRouterConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OpenRouterConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenRouterConfig {
        OpenRouterConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// OpenRouter provider for narrative summaries.
///
/// # Example
///
/// ```rust,ignore
/// use lex_explore::ai::{OpenRouterConfig, OpenRouterProvider};
///
/// // Simple usage with defaults
/// let provider = OpenRouterProvider::new("your-api-key")?;
///
/// // With custom configuration
/// let config = OpenRouterConfig::builder()
///     .model("openai/gpt-4o")
///     .timeout_secs(60)
///     .build();
/// let provider = OpenRouterProvider::with_config("your-api-key", config)?;
/// ```
pub struct OpenRouterProvider {
    api_key: String,
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, OpenRouterConfig::default())
    }

    /// Create a new OpenRouter provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    /// Create a provider from the `OPENROUTER_API_KEY` environment variable.
    pub fn from_env(config: OpenRouterConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| anyhow!("{} is not set", API_KEY_ENV))?;
        Self::with_config(api_key, config)
    }

    fn build_request(&self, prompt: &str) -> OpenRouterRequest {
        OpenRouterRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

impl AIProvider for OpenRouterProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Calling OpenRouter with model {}", self.config.model);

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "lex-explore")
            .json(&self.build_request(prompt))
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "OpenRouter API Error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: OpenRouterResponse = response.json()?;
        result
            .into_text()
            .ok_or_else(|| anyhow!("No response content from OpenRouter API"))
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Response parsing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_valid_response_structure() {
        let json = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Ages cluster around 25."
                }
            }]
        }"#;

        let response: OpenRouterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_text().as_deref(),
            Some("Ages cluster around 25.")
        );
    }

    #[test]
    fn test_parse_response_with_empty_choices() {
        let response: OpenRouterResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_parse_response_with_null_choices() {
        let response: OpenRouterResponse = serde_json::from_str(r#"{"choices": null}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_parse_response_missing_message() {
        let json = r#"{"choices": [{"message": null}]}"#;
        let response: OpenRouterResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_parse_malformed_json() {
        let json = r#"{"choices": [{"message": "not an object"}]}"#;
        let result: std::result::Result<OpenRouterResponse, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    // -------------------------------------------------------------------------
    // Config and request tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_config_defaults() {
        let config = OpenRouterConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_builder() {
        let config = OpenRouterConfig::builder()
            .model("openai/gpt-4o")
            .temperature(0.2)
            .max_tokens(256)
            .timeout_secs(10)
            .base_url("http://localhost:9999")
            .build();

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.timeout_secs, Some(10));
        assert_eq!(config.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_request_carries_prompt_as_user_message() {
        let provider = OpenRouterProvider::new("test-key").unwrap();
        let request = provider.build_request("hello");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_provider_identity() {
        let provider = OpenRouterProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "OpenRouter");
        assert_eq!(provider.model(), Some(DEFAULT_MODEL));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let config = OpenRouterConfig::builder()
            .base_url("http://127.0.0.1:9/chat")
            .timeout_secs(2)
            .build();
        let provider = OpenRouterProvider::with_config("test-key", config).unwrap();
        assert!(provider.generate("hello").is_err());
    }
}
