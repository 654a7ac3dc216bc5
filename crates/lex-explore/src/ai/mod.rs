//! Language-model providers for the narrative summary.
//!
//! # Feature Flag
//!
//! The concrete HTTP providers require the `ai` feature flag. The
//! [`AIProvider`] trait is always available for custom implementations.
//!
//! ```toml
//! # Enable AI support (default)
//! lex-explore = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for smaller binary
//! lex-explore = { version = "0.1", default-features = false }
//! ```
//!
//! # Providers
//!
//! - [`OllamaProvider`] - local Ollama server (requires `ai` feature)
//! - [`OpenRouterProvider`] - OpenRouter API (requires `ai` feature)

// Provider trait is always available (for custom implementations)
mod provider;
pub use provider::AIProvider;

// Concrete providers require the "ai" feature
#[cfg(feature = "ai")]
mod ollama;
#[cfg(feature = "ai")]
mod openrouter;

#[cfg(feature = "ai")]
pub use ollama::{OllamaConfig, OllamaConfigBuilder, OllamaProvider};

#[cfg(feature = "ai")]
pub use openrouter::{OpenRouterConfig, OpenRouterConfigBuilder, OpenRouterProvider};
