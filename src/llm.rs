// Completion provider: OpenAI-compatible chat-completion client plus the
// deterministic template fallback used when the hosted call fails.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Sampling temperature for every completion request.
const TEMPERATURE: f32 = 0.7;
/// Output cap for every completion request.
const MAX_TOKENS: u32 = 500;

/// Prefix of every fallback response.
pub const FALLBACK_PREFIX: &str = "I'm sorry, I'm having trouble processing your request. ";

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API error ({status}): {body}")]
    Api { status: StatusCode, body: String },
    #[error("completion API returned no choices")]
    Empty,
}

/// Seam between the chat pipeline and the hosted LLM, so tests can inject a
/// static or failing provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError>;
}

/// Client for Groq's OpenAI-compatible chat-completion endpoint. Built once
/// at startup from configuration and shared by reference; holds no per-call
/// state.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl GroqClient {
    /// The request timeout bounds a hung upstream call so it trips the same
    /// fallback as an API error.
    pub fn new(api_key: String, api_url: String, model: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_url,
            model,
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "stream": false
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, body });
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::Empty)
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

/// Deterministic response used when the completion call fails. Always
/// non-empty, never errors.
pub fn fallback_response(query: &str) -> String {
    format!("{FALLBACK_PREFIX}{}", template_advice(query))
}

/// Pick a canned sentence by simple substring tests on the lowercased query.
fn template_advice(query: &str) -> &'static str {
    let lowered = query.to_lowercase();
    if lowered.contains("strategy") {
        "For an effective strategy, consider balancing your offensive and defensive capabilities. Would you like specific advice on attack or defense?"
    } else if lowered.contains("upgrade") {
        "Upgrading your buildings and troops in the right order is key to successful progression. Generally, focus on offensive capabilities first."
    } else if lowered.contains("attack") {
        "When attacking, it's important to scout the enemy base and plan accordingly. Look for weaknesses in their defense layout."
    } else {
        "I can provide strategy advice, upgrade recommendations, and gameplay tips. What specific aspect of the game are you interested in?"
    }
}
