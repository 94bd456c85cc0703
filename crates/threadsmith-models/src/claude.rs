//! Claude (Anthropic) messages API provider.
//!
//! Claude takes system instructions through a dedicated `system` request
//! field, so the conversation is split into a system prompt and the
//! remaining turns before the request goes out.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use threadsmith_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use tracing::{debug, error};

const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// `Model` backed by the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct ClaudeModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
}

/// Splits the system prompt (Claude wants it as a request field) from the
/// conversational turns. Non-assistant roles other than "system" are sent
/// as user turns.
fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<WireMessage>) {
    let mut system = None;
    let mut turns = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role.as_str() {
            "system" => {
                if system.is_none() {
                    system = Some(message.content.clone());
                }
            }
            "assistant" => turns.push(WireMessage::assistant(&message.content)),
            _ => turns.push(WireMessage::user(&message.content)),
        }
    }

    (system, turns)
}

impl ClaudeModel {
    /// Creates a model that authenticates with the `ANTHROPIC_API_KEY`
    /// environment variable.
    ///
    /// # Errors
    /// Returns `ModelError::MissingApiKey` if the variable is not set.
    pub fn new(model_id: String) -> Result<Self, ModelError> {
        let api_key = env::var(ANTHROPIC_API_KEY_ENV).map_err(|_| ModelError::MissingApiKey {
            provider: "anthropic".to_string(),
            env_var: ANTHROPIC_API_KEY_ENV.to_string(),
        })?;

        Ok(Self::with_api_key(model_id, api_key))
    }

    /// Creates a model with an explicit API key.
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self {
            model_id,
            api_key,
            base_url: "https://api.anthropic.com/v1".to_string(),
            client: Client::new(),
        }
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> MessagesRequest {
        let (system, turns) = split_system(messages);
        let params = parameters.unwrap_or_default();

        MessagesRequest {
            model: self.model_id.clone(),
            messages: turns,
            max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            temperature: params.temperature,
            top_p: params.top_p,
            stop_sequences: params.stop_sequences,
        }
    }
}

#[async_trait]
impl Model for ClaudeModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.generate_chat_completion(&[ChatMessage::user(prompt)], parameters).await
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            "Sending messages request to Claude"
        );

        let request = self.build_request(messages, parameters);
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Claude request could not be sent");
                ModelError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "no error body".to_string());
            error!(status = %status, detail = %detail, "Claude returned an error status");

            // Billing and rate-limit statuses are hard stops.
            if matches!(status, StatusCode::PAYMENT_REQUIRED | StatusCode::TOO_MANY_REQUESTS) {
                return Err(ModelError::QuotaExceeded {
                    provider: "anthropic".to_string(),
                    message: detail,
                });
            }

            return Err(ModelError::Response(format!("{status}: {detail}")));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Serialization(format!("unreadable response: {e}")))?;

        let content = reply
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .ok_or_else(|| ModelError::Response("reply carried no text block".to_string()))?;

        Ok(ModelResponse {
            content,
            model_id: Some(self.model_id.clone()),
            usage: Some(ModelUsage {
                prompt_tokens: reply.usage.input_tokens,
                completion_tokens: reply.usage.output_tokens,
                total_tokens: reply.usage.input_tokens + reply.usage.output_tokens,
            }),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Anthropic messages API wire shapes.

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl WireMessage {
    fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: content.to_string() }
    }

    fn assistant(content: &str) -> Self {
        Self { role: "assistant".to_string(), content: content.to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: TokenCounts,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct TokenCounts {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_is_reported() {
        let model =
            ClaudeModel::with_api_key("claude-sonnet-4-5".to_string(), "test-key".to_string());
        assert_eq!(model.model_id(), "claude-sonnet-4-5");
    }

    #[test]
    fn test_split_system_extracts_first_system_message() {
        let (system, turns) = split_system(&[
            ChatMessage::system("You are a meme researcher"),
            ChatMessage::user("Find trends"),
            ChatMessage::assistant("Here are some trends"),
        ]);

        assert_eq!(system.as_deref(), Some("You are a meme researcher"));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[1].role, "assistant");
    }

    #[test]
    fn test_split_system_without_system_message() {
        let (system, turns) = split_system(&[ChatMessage::user("Find trends")]);
        assert!(system.is_none());
        assert_eq!(turns.len(), 1);
    }

    #[test]
    fn test_request_falls_back_to_default_parameters() {
        let model = ClaudeModel::with_api_key("claude-sonnet-4-5".to_string(), "k".to_string());

        let request = model.build_request(&[ChatMessage::user("hi")], None);
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn test_request_requires_max_tokens_even_when_unset() {
        let model = ClaudeModel::with_api_key("claude-sonnet-4-5".to_string(), "k".to_string());
        let params = ModelParameters {
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop_sequences: None,
        };

        let request = model.build_request(&[ChatMessage::user("hi")], Some(params));
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.temperature.is_none());
    }

    #[test]
    #[ignore = "Requires API key and network access"]
    fn test_claude_generate_text() {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            if env::var(ANTHROPIC_API_KEY_ENV).is_err() {
                eprintln!("Skipping test: {ANTHROPIC_API_KEY_ENV} not set");
                return;
            }

            let model = ClaudeModel::new("claude-sonnet-4-5".to_string()).unwrap();
            let response =
                model.generate_text("Say hello", None).await.expect("Should generate text");

            assert!(!response.content.is_empty());
            assert_eq!(response.model_id, Some("claude-sonnet-4-5".to_string()));
        });
    }
}
