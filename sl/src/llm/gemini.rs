//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the `generateContent` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Longest server-requested wait honoured before giving up on a 429
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Delay before retry number `attempt + 1`, or `None` to give up
fn retry_delay(error: &LlmError, attempt: u32) -> Option<Duration> {
    if attempt >= MAX_RETRIES || !error.is_retryable() {
        return None;
    }
    if error.is_rate_limit() {
        return error.retry_after().filter(|wait| *wait <= MAX_RATE_LIMIT_WAIT);
    }
    Some(Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt)))
}

/// Google Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let api_key = config.get_api_key().map_err(|e| LlmError::Config(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            },
        });

        if !request.system_prompt.trim().is_empty() {
            debug!("build_request_body: adding system instruction");
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": request.system_prompt }],
            });
        } else {
            debug!("build_request_body: no system instruction");
        }

        body
    }

    /// Parse the Gemini API response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<CompletionResponse, LlmError> {
        debug!(candidates = api_response.candidates.len(), "parse_response: called");
        if let Some(reason) = api_response.prompt_feedback.and_then(|f| f.block_reason) {
            debug!(%reason, "parse_response: prompt blocked");
            return Err(LlmError::InvalidResponse(format!("Prompt blocked: {}", reason)));
        }

        let Some(candidate) = api_response.candidates.into_iter().next() else {
            debug!("parse_response: no candidates");
            return Err(LlmError::InvalidResponse("No candidates in response".to_string()));
        };

        let stop_reason = candidate
            .finish_reason
            .as_deref()
            .map(StopReason::from_gemini)
            .unwrap_or(StopReason::EndTurn);

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            debug!(?stop_reason, "parse_response: empty content");
            return Err(LlmError::InvalidResponse(format!(
                "Empty response (finish reason: {:?})",
                stop_reason
            )));
        }

        if stop_reason == StopReason::MaxTokens {
            warn!("parse_response: output truncated at max tokens");
        }

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            stop_reason,
            usage,
        })
    }
}

impl GeminiClient {
    /// One request, without retries
    async fn send_once(&self, url: &str, body: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            debug!("send_once: rate limited (429)");
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "send_once: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let text = response.text().await?;
        let api_response: GeminiResponse = serde_json::from_str(&text)?;
        self.parse_response(api_response)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let url = self.endpoint();
        let body = self.build_request_body(&request);

        let mut attempt = 0;
        loop {
            let error = match self.send_once(&url, &body).await {
                Ok(response) => {
                    debug!(attempt, "complete: success");
                    return Ok(response);
                }
                Err(e) => e,
            };

            let Some(delay) = retry_delay(&error, attempt) else {
                debug!(attempt, error = %error, "complete: giving up");
                return Err(error);
            };
            attempt += 1;
            warn!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "complete: retrying");
            tokio::time::sleep(delay).await;
        }
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}
