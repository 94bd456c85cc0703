//! Scripted model for driving pipeline tests.
//!
//! Plays back a fixed queue of canned responses, one per call, and records
//! every conversation it was shown so tests can assert on prompt contents.
//! Once the queue is empty further calls fail, which catches runs that make
//! more model calls than the test scripted for.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use threadsmith_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse,
};
use tracing::debug;

/// A `Model` that returns pre-scripted responses in order.
#[derive(Debug)]
pub struct ScriptedModel {
    id: String,
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    /// Creates a scripted model that will answer with `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            id: "scripted".to_string(),
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The conversations passed to this model so far, in call order.
    pub fn recorded_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn next_response(&self, call_index: usize) -> Result<String, ModelError> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| {
                ModelError::Response(format!(
                    "script exhausted: no response queued for call {}",
                    call_index + 1
                ))
            })
    }
}

#[async_trait]
impl Model for ScriptedModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        let messages = vec![ChatMessage::user(prompt)];
        self.generate_chat_completion(&messages, parameters).await
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        _parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(messages.to_vec());
            calls.len() - 1
        };

        debug!(
            model_id = %self.id,
            call_index,
            message_count = messages.len(),
            "ScriptedModel playing back response"
        );

        let content = self.next_response(call_index)?;

        Ok(ModelResponse { content, model_id: Some(self.id.clone()), usage: None })
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_model_plays_responses_in_order() {
        let model = ScriptedModel::new(vec!["first".to_string(), "second".to_string()]);

        let a = model.generate_text("one", None).await.unwrap();
        let b = model.generate_text("two", None).await.unwrap();

        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(model.remaining(), 0);
    }

    #[tokio::test]
    async fn test_scripted_model_errors_when_exhausted() {
        let model = ScriptedModel::new(vec!["only".to_string()]);

        model.generate_text("one", None).await.unwrap();
        let err = model.generate_text("two", None).await.unwrap_err();

        assert!(matches!(err, ModelError::Response(_)));
    }

    #[tokio::test]
    async fn test_scripted_model_records_conversations() {
        let model = ScriptedModel::new(vec!["ok".to_string()]);

        let messages =
            vec![ChatMessage::system("you are a judge"), ChatMessage::user("score this")];
        model.generate_chat_completion(&messages, None).await.unwrap();

        let calls = model.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, "system");
        assert!(calls[0][1].content.contains("score this"));
    }
}
