//! Request and response types for the generation client

use tracing::debug;

/// A single, stateless generation request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Generated text plus accounting
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    Safety,
    Other,
}

impl StopReason {
    /// Parse from a Gemini `finishReason` string
    pub fn from_gemini(s: &str) -> Self {
        debug!(%s, "StopReason::from_gemini: called");
        match s {
            "STOP" => Self::EndTurn,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => Self::Safety,
            other => {
                debug!(%other, "StopReason::from_gemini: unrecognised reason");
                Self::Other
            }
        }
    }
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
