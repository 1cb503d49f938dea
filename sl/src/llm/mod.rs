//! Generation client module for StudyLab
//!
//! Sends the assembled prompt to a hosted model and returns the sheet text.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create a generation client based on the provider specified in config
///
/// Supports the "gemini" provider.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}
