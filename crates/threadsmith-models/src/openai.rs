//! OpenAI chat completions provider.
//!
//! Unlike Claude, OpenAI accepts system messages inline in the messages
//! array, so the conversation maps onto the wire request one to one.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use threadsmith_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use tracing::{debug, error};

const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// `Model` backed by the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAIModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAIModel {
    /// Creates a model that authenticates with the `OPENAI_API_KEY`
    /// environment variable.
    ///
    /// # Errors
    /// Returns `ModelError::MissingApiKey` if the variable is not set.
    pub fn new(model_id: String) -> Result<Self, ModelError> {
        let api_key = env::var(OPENAI_API_KEY_ENV).map_err(|_| ModelError::MissingApiKey {
            provider: "openai".to_string(),
            env_var: OPENAI_API_KEY_ENV.to_string(),
        })?;

        Ok(Self::with_api_key(model_id, api_key))
    }

    /// Creates a model with an explicit API key.
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self {
            model_id,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            client: Client::new(),
        }
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> ChatRequest {
        let params = parameters.unwrap_or_default();

        ChatRequest {
            model: self.model_id.clone(),
            messages: messages.iter().map(ChatTurn::from).collect(),
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            stop: params.stop_sequences,
        }
    }
}

#[async_trait]
impl Model for OpenAIModel {
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
            "Sending chat completion request to OpenAI"
        );

        let request = self.build_request(messages, parameters);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "OpenAI request could not be sent");
                ModelError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "no error body".to_string());
            error!(status = %status, detail = %detail, "OpenAI returned an error status");

            // Billing and rate-limit statuses are hard stops.
            if matches!(status, StatusCode::PAYMENT_REQUIRED | StatusCode::TOO_MANY_REQUESTS) {
                return Err(ModelError::QuotaExceeded {
                    provider: "openai".to_string(),
                    message: detail,
                });
            }

            return Err(ModelError::Response(format!("{status}: {detail}")));
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| ModelError::Serialization(format!("unreadable response: {e}")))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ModelError::Response("reply carried no choices".to_string()))?;

        let usage = reply.usage.map(|u| ModelUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ModelResponse { content, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// OpenAI chat completions API wire shapes.

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatTurn {
    role: String,
    content: String,
}

impl From<&ChatMessage> for ChatTurn {
    fn from(message: &ChatMessage) -> Self {
        Self { role: message.role.clone(), content: message.content.clone() }
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatTurn,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)] // Field names mirror the wire format
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
