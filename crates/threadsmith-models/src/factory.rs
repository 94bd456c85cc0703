//! Turns a provider name and model ID into a ready `Model` instance.
//!
//! Keys may be passed explicitly; otherwise each provider reads its own
//! environment variable.

use crate::{ClaudeModel, MockModel, OpenAIModel};
use std::str::FromStr;
use std::sync::Arc;
use threadsmith_abstraction::{Model, ModelError};
use tracing::debug;

/// A model provider the factory knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Echoing stub, no network.
    Mock,
    /// Anthropic messages API.
    Claude,
    /// OpenAI chat completions API.
    OpenAI,
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "claude" | "anthropic" => Ok(Self::Claude),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ModelError::UnsupportedProvider(s.to_string())),
        }
    }
}

impl ModelType {
    /// The model ID used when the caller does not specify one.
    #[must_use]
    pub fn default_model_id(self) -> &'static str {
        match self {
            Self::Mock => "mock-model",
            Self::Claude => "claude-sonnet-4-5",
            Self::OpenAI => "gpt-4o",
        }
    }
}

/// Which provider to build, which model ID to ask it for, and optionally an
/// explicit API key. Without a key the provider reads its own environment
/// variable.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Which provider to build.
    pub model_type: ModelType,
    /// The model ID (e.g., "claude-sonnet-4-5", "gpt-4o").
    pub model_id: String,
    /// Explicit API key; when absent the provider reads its environment.
    pub api_key: Option<String>,
}

impl ModelConfig {
    /// A config for the given provider and model ID, with no explicit key.
    #[must_use]
    pub fn new(model_type: ModelType, model_id: String) -> Self {
        Self { model_type, model_id, api_key: None }
    }

    /// Attaches an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

/// Builds `Model` instances from a `ModelConfig`.
pub struct ModelFactory;

impl ModelFactory {
    /// Builds the model the config describes.
    ///
    /// # Errors
    /// Returns a `ModelError` if construction fails (e.g. no API key in the
    /// config or the environment).
    pub fn create(config: ModelConfig) -> Result<Arc<dyn Model + Send + Sync>, ModelError> {
        debug!(
            model_type = ?config.model_type,
            model_id = %config.model_id,
            "Constructing model"
        );

        match (config.model_type, config.api_key) {
            (ModelType::Mock, _) => Ok(Arc::new(MockModel::new(config.model_id))),
            (ModelType::Claude, Some(key)) => {
                Ok(Arc::new(ClaudeModel::with_api_key(config.model_id, key)))
            }
            (ModelType::Claude, None) => Ok(Arc::new(ClaudeModel::new(config.model_id)?)),
            (ModelType::OpenAI, Some(key)) => {
                Ok(Arc::new(OpenAIModel::with_api_key(config.model_id, key)))
            }
            (ModelType::OpenAI, None) => Ok(Arc::new(OpenAIModel::new(config.model_id)?)),
        }
    }
}
