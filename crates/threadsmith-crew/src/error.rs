// Error types for crew assembly and execution

use thiserror::Error;
use threadsmith_core::OutputKind;

/// Result type for crew operations
pub type Result<T> = std::result::Result<T, CrewError>;

/// Crew errors
#[derive(Debug, Error)]
pub enum CrewError {
    /// Configuration error (fatal at startup)
    #[error("configuration error: {0}")]
    Config(#[from] threadsmith_core::ConfigError),

    /// A Result Schema invariant was violated
    #[error("schema violation: {0}")]
    Schema(#[from] threadsmith_core::SchemaError),

    /// The underlying model call failed
    #[error("model error: {0}")]
    Model(#[from] threadsmith_abstraction::ModelError),

    /// A task is wired to an agent that does not exist
    #[error("task '{task}' is assigned to unknown agent '{agent}'")]
    UnknownAgent {
        /// Task key
        task: String,
        /// The missing agent key
        agent: String,
    },

    /// An agent is granted a tool that was not provided
    #[error("agent '{agent}' is granted unknown tool '{tool}'")]
    UnknownTool {
        /// Agent key
        agent: String,
        /// The missing tool name
        tool: String,
    },

    /// A task depends on a task that does not run before it
    #[error("task '{task}' depends on '{dependency}' which does not run before it")]
    ContextOrder {
        /// Task key
        task: String,
        /// The out-of-order dependency key
        dependency: String,
    },

    /// A task's config declares a different output shape than the pipeline requires
    #[error("task '{task}' must declare output '{expected}', found '{declared}'")]
    WrongOutputKind {
        /// Task key
        task: String,
        /// The shape the fixed pipeline requires
        expected: OutputKind,
        /// The shape the config declared
        declared: OutputKind,
    },

    /// The model requested a tool its agent does not hold
    #[error("tool '{tool}' is not available to task '{task}'")]
    ToolUnavailable {
        /// Task key
        task: String,
        /// Requested tool name
        tool: String,
    },

    /// Invalid tool arguments
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidToolArguments {
        /// Tool name
        tool: String,
        /// Reason why arguments are invalid
        reason: String,
    },

    /// Tool invocation failed (network, auth, provider error)
    #[error("tool '{tool}' failed: {message}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Failure detail
        message: String,
    },

    /// A task's reply did not conform to its declared output shape
    #[error("task '{task}' produced malformed '{expected}' output: {reason}")]
    MalformedTaskOutput {
        /// Task key
        task: String,
        /// The declared shape
        expected: OutputKind,
        /// Parse or validation failure detail
        reason: String,
    },

    /// A task kept requesting tools past the iteration cap
    #[error("task '{task}' exceeded {limit} tool iterations")]
    ToolIterationsExceeded {
        /// Task key
        task: String,
        /// The configured cap
        limit: usize,
    },

    /// The whole run exceeded its time budget
    #[error("run timed out after {0} seconds")]
    Timeout(u64),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
