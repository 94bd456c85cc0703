//! Model implementations for Threadsmith.
//!
//! Every provider here implements the `Model` trait from
//! `threadsmith-abstraction`; the crew runner does not care which one it
//! gets.
//!
//! # Providers
//!
//! - **Mock**: Echoing stub for wiring checks, no network
//! - **Scripted**: Plays back a fixed sequence of responses (pipeline tests)
//! - **Claude**: Anthropic messages API (needs `ANTHROPIC_API_KEY`)
//! - **OpenAI**: OpenAI chat completions API (needs `OPENAI_API_KEY`)

pub mod claude;
pub mod factory;
pub mod openai;
pub mod scripted;

use async_trait::async_trait;
use std::fmt::Write;
use threadsmith_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use tracing::debug;

pub use claude::ClaudeModel;
pub use factory::{ModelConfig, ModelFactory, ModelType};
pub use openai::OpenAIModel;
pub use scripted::ScriptedModel;

/// Offline stand-in for a real provider.
///
/// Echoes the conversation back instead of reasoning about it, so a run
/// against it exercises prompt assembly without any network traffic. The
/// echo is plain prose and never parses as JSON.
#[derive(Debug, Default)]
pub struct MockModel {
    id: String,
}

impl MockModel {
    /// A mock that reports the given model ID.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self { id }
    }

    fn respond(&self, prompt_tokens: u32, content: String) -> ModelResponse {
        let completion_tokens = count_tokens(&content);
        ModelResponse {
            content,
            model_id: Some(self.id.clone()),
            usage: Some(ModelUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        }
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.id,
            prompt_len = prompt.len(),
            parameters = ?parameters,
            "MockModel echoing prompt"
        );

        let content = format!("Echo from {}: {prompt}", self.id);
        Ok(self.respond(count_tokens(prompt), content))
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.id,
            message_count = messages.len(),
            parameters = ?parameters,
            "MockModel echoing conversation"
        );

        let mut echo = format!("Echo from {} ({} turns)\n", self.id, messages.len());
        for message in messages {
            let _ = writeln!(echo, "[{}] {}", message.role, message.content);
        }

        let prompt_tokens: u32 = messages.iter().map(|m| count_tokens(&m.content)).sum();
        Ok(self.respond(prompt_tokens, echo))
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

/// Rough token estimate: about one token per four characters.
fn count_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count().div_ceil(4)).unwrap_or(u32::MAX)
}
