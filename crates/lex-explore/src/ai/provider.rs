//! Language-model provider trait.
//!
//! This module defines the [`AIProvider`] trait that lets the narrative
//! summarizer talk to any text-generation backend (Ollama, OpenRouter, or
//! a caller-supplied client) without knowing which one it is.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `openai.rs`)
//! 2. Implement the [`AIProvider`] trait for your provider struct
//! 3. Export the provider in `src/ai/mod.rs`
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_explore::ai::{AIProvider, OllamaProvider};
//!
//! let provider = OllamaProvider::new()?;
//! let text = provider.generate("Summarize: ...")?;
//! ```

use anyhow::Result;

/// Trait for backends that turn a prompt into text.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a provider can be shared.
///
/// # Error Handling
///
/// Implementations return meaningful errors via `anyhow::Result`. Callers
/// make a single attempt and do not retry.
pub trait AIProvider: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The service is unreachable or times out
    /// - The service answers with a non-success status
    /// - The response body cannot be parsed
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
