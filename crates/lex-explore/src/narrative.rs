//! Narrative summaries from a language model.
//!
//! The summary statistics are rendered to text, wrapped in a fixed prompt
//! and sent to an [`AIProvider`] once. Any failure becomes
//! [`ExploreError::ExternalService`]; nothing is retried.

use crate::ai::AIProvider;
use crate::error::{ExploreError, Result};
use tracing::{info, warn};

/// Wrap a statistics summary in the narrative prompt.
pub fn build_prompt(stats_text: &str) -> String {
    format!(
        "Here is a summary of the dataset:\n{}\n\n\
         Based on this data summary, provide insights on trends, anomalies, and possible predictions.",
        stats_text.trim_end()
    )
}

/// Ask `provider` for insights about `stats_text`.
pub fn summarize(stats_text: &str, provider: &dyn AIProvider) -> Result<String> {
    let prompt = build_prompt(stats_text);
    info!(
        "Requesting narrative from {} ({})",
        provider.name(),
        provider.model().unwrap_or("default model")
    );

    let text = provider.generate(&prompt).map_err(|e| {
        warn!("{} call failed: {}", provider.name(), e);
        ExploreError::ExternalService(format!("{}: {}", provider.name(), e))
    })?;

    if text.trim().is_empty() {
        return Err(ExploreError::ExternalService(format!(
            "{} returned an empty response",
            provider.name()
        )));
    }
    Ok(text)
}
