//! Model abstraction layer for Threadsmith.
//!
//! Defines the `Model` trait the crew runner speaks to, plus the message,
//! parameter, and response types shared by every provider implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error returned while talking to a language model provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// The HTTP request itself failed (network, TLS, malformed request).
    #[error("request error: {0}")]
    Request(String),

    /// The provider answered with an error payload or unusable response.
    #[error("provider response error: {0}")]
    Response(String),

    /// Serializing the request or deserializing the response failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The provider requires an API key that is not configured.
    #[error("missing API key for provider '{provider}' (set {env_var})")]
    MissingApiKey {
        /// The provider name (e.g. "anthropic", "openai").
        provider: String,
        /// Environment variable the key is read from.
        env_var: String,
    },

    /// The requested provider is unknown or not compiled in.
    #[error("unsupported model provider: {0}")]
    UnsupportedProvider(String),

    /// Provider quota exceeded or rate limit hit (hard stop).
    #[error("provider '{provider}' quota exceeded: {message}")]
    QuotaExceeded {
        /// Provider that reported the limit.
        provider: String,
        /// Status or error text reported by the provider.
        message: String,
    },
}

/// One message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the sender: "system", "user", or "assistant".
    pub role: String,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// Sampling parameters for a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Sampling temperature, between 0 and 2. Higher values take more risks.
    pub temperature: Option<f32>,

    /// Nucleus sampling: consider tokens within `top_p` probability mass.
    pub top_p: Option<f32>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sequences where the provider stops generating further tokens.
    pub stop_sequences: Option<Vec<String>>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        // Thread drafts and reviews run long; 512 tokens truncates them.
        Self {
            temperature: Some(0.7),
            top_p: Some(1.0),
            max_tokens: Some(2048),
            stop_sequences: None,
        }
    }
}

/// The response from a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated text.
    pub content: String,

    /// The model that produced the response, when the provider reports it.
    pub model_id: Option<String>,

    /// Token accounting, when the provider reports it.
    pub usage: Option<ModelUsage>,
}

/// Token usage for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,

    /// Tokens in the completion.
    pub completion_tokens: u32,

    /// Total tokens billed.
    pub total_tokens: u32,
}

/// A language model the pipeline can delegate reasoning to.
///
/// Implementations must be `Send + Sync`; the runner shares one model across
/// all tasks of a run behind an `Arc`.
#[async_trait]
pub trait Model: Send + Sync {
    /// Generates a completion for a single free-form prompt.
    ///
    /// # Errors
    /// Returns a `ModelError` if the provider call fails.
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Generates the next assistant turn for a conversation.
    ///
    /// # Errors
    /// Returns a `ModelError` if the provider call fails.
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the identifier of the underlying model.
    fn model_id(&self) -> &str;
}
