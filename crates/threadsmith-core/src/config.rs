//! Declarative pipeline configuration (TOML format).
//!
//! Two files drive a run: `agents.toml` (role records) and `tasks.toml`
//! (task records). Both are parsed and validated at startup; anything
//! malformed is a fatal error before any network call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A required entry is missing from a config file.
    #[error("missing {kind} entry '{key}'")]
    MissingEntry {
        /// Which collection the entry was expected in ("agent" or "task").
        kind: &'static str,
        /// The missing key.
        key: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which Result Schema shape a task must emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Free-form text (research notes).
    Text,
    /// An array of `ThreadCandidate` records.
    ThreadCandidates,
    /// An array of `ViralScore` records.
    ViralScores,
    /// One `Review` record.
    Review,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::ThreadCandidates => write!(f, "thread_candidates"),
            Self::ViralScores => write!(f, "viral_scores"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// One `[agents.<key>]` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Display name of the role (e.g., "Meme Crafter").
    pub role: String,

    /// What the agent is trying to achieve.
    pub goal: String,

    /// Persona text that shapes how the agent writes.
    pub backstory: String,

    /// Names of the tools this role is granted. Empty by default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

/// Agent configuration file (`agents.toml`).
///
/// # Example TOML
///
/// ```toml
/// [agents.meme_crafter]
/// role = "Meme Crafter"
/// goal = "Find meme formats that fit the topic"
/// backstory = "You live in the reply sections of tech Twitter."
/// tools = ["web_search"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Role records keyed by agent key.
    pub agents: BTreeMap<String, AgentEntry>,
}

impl AgentsConfig {
    /// Loads agent configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading agents config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses agent configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the entry for `key`, or a `MissingEntry` error.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEntry` when the key is absent.
    pub fn get(&self, key: &str) -> Result<&AgentEntry> {
        self.agents
            .get(key)
            .ok_or_else(|| ConfigError::MissingEntry { kind: "agent", key: key.to_string() })
    }

    /// Validate configuration.
    fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(ConfigError::Invalid("no agents defined".to_string()));
        }

        for (key, entry) in &self.agents {
            if entry.role.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("agent '{key}' has an empty role")));
            }
            if entry.goal.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("agent '{key}' has an empty goal")));
            }
            if entry.backstory.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("agent '{key}' has an empty backstory")));
            }
        }

        Ok(())
    }
}

/// One `[tasks.<key>]` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// What the task asks its agent to do. May contain `{topic}`,
    /// `{platform}`, and `{target_audience}` placeholders.
    pub description: String,

    /// Prose description of the expected result, shown to the agent.
    pub expected_output: String,

    /// Key of the agent that executes this task.
    pub agent: String,

    /// Keys of earlier tasks whose outputs this task consumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,

    /// The record shape the task must emit.
    pub output: OutputKind,
}

/// Task configuration file (`tasks.toml`).
///
/// # Example TOML
///
/// ```toml
/// [tasks.write_thread]
/// description = "Draft three thread candidates about {topic}"
/// expected_output = "A JSON array of three thread candidates"
/// agent = "hooksmith"
/// context = ["meme_research"]
/// output = "thread_candidates"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Task records keyed by task key.
    pub tasks: BTreeMap<String, TaskEntry>,
}

impl TasksConfig {
    /// Loads task configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading tasks config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses task configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the entry for `key`, or a `MissingEntry` error.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEntry` when the key is absent.
    pub fn get(&self, key: &str) -> Result<&TaskEntry> {
        self.tasks
            .get(key)
            .ok_or_else(|| ConfigError::MissingEntry { kind: "task", key: key.to_string() })
    }

    /// Validate configuration.
    fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(ConfigError::Invalid("no tasks defined".to_string()));
        }

        for (key, entry) in &self.tasks {
            if entry.description.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("task '{key}' has an empty description")));
            }
            if entry.expected_output.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "task '{key}' has an empty expected_output"
                )));
            }
            if entry.agent.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("task '{key}' names no agent")));
            }
            for context_key in &entry.context {
                if context_key == key {
                    return Err(ConfigError::Invalid(format!(
                        "task '{key}' lists itself as context"
                    )));
                }
                if !self.tasks.contains_key(context_key) {
                    return Err(ConfigError::Invalid(format!(
                        "task '{key}' references unknown context task '{context_key}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const AGENTS_TOML: &str = r#"
[agents.hooksmith]
role = "Hook Specialist"
goal = "Open threads people cannot scroll past"
backstory = "You have written a thousand first lines."

[agents.meme_crafter]
role = "Meme Crafter"
goal = "Find meme formats that fit the topic"
backstory = "You live in the reply sections of tech Twitter."
tools = ["web_search"]
"#;

    const TASKS_TOML: &str = r#"
[tasks.meme_research]
description = "Research memes about {topic} for {target_audience}"
expected_output = "Research notes"
agent = "meme_crafter"
output = "text"

[tasks.write_thread]
description = "Draft three thread candidates about {topic} for {platform}"
expected_output = "A JSON array of three thread candidates"
agent = "hooksmith"
context = ["meme_research"]
output = "thread_candidates"
"#;

    #[test]
    fn test_agents_config_parses() {
        let config = AgentsConfig::from_toml_str(AGENTS_TOML).unwrap();
        assert_eq!(config.agents.len(), 2);

        let crafter = config.get("meme_crafter").unwrap();
        assert_eq!(crafter.role, "Meme Crafter");
        assert_eq!(crafter.tools, vec!["web_search".to_string()]);

        let hooksmith = config.get("hooksmith").unwrap();
        assert!(hooksmith.tools.is_empty());
    }

    #[test]
    fn test_agents_config_missing_entry() {
        let config = AgentsConfig::from_toml_str(AGENTS_TOML).unwrap();
        let err = config.get("quality_judge").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEntry { kind: "agent", .. }));
    }

    #[test]
    fn test_agents_config_rejects_empty_role() {
        let toml_content = r#"
[agents.bad]
role = ""
goal = "something"
backstory = "someone"
"#;
        let err = AgentsConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_tasks_config_parses() {
        let config = TasksConfig::from_toml_str(TASKS_TOML).unwrap();
        let write = config.get("write_thread").unwrap();
        assert_eq!(write.agent, "hooksmith");
        assert_eq!(write.context, vec!["meme_research".to_string()]);
        assert_eq!(write.output, OutputKind::ThreadCandidates);

        let research = config.get("meme_research").unwrap();
        assert!(research.context.is_empty());
        assert_eq!(research.output, OutputKind::Text);
    }

    #[test]
    fn test_tasks_config_rejects_unknown_context() {
        let toml_content = r#"
[tasks.lonely]
description = "Do something"
expected_output = "Something"
agent = "hooksmith"
context = ["missing_task"]
output = "text"
"#;
        let err = TasksConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_tasks_config_rejects_self_context() {
        let toml_content = r#"
[tasks.loopy]
description = "Do something"
expected_output = "Something"
agent = "hooksmith"
context = ["loopy"]
output = "text"
"#;
        let err = TasksConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_tasks_config_rejects_unknown_output_kind() {
        let toml_content = r#"
[tasks.bad]
description = "Do something"
expected_output = "Something"
agent = "hooksmith"
output = "interpretive_dance"
"#;
        let err = TasksConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(AGENTS_TOML.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = AgentsConfig::load(file.path()).unwrap();
        assert!(config.agents.contains_key("hooksmith"));
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = AgentsConfig::load("/nonexistent/agents.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_output_kind_display() {
        assert_eq!(OutputKind::Text.to_string(), "text");
        assert_eq!(OutputKind::ThreadCandidates.to_string(), "thread_candidates");
        assert_eq!(OutputKind::ViralScores.to_string(), "viral_scores");
        assert_eq!(OutputKind::Review.to_string(), "review");
    }
}
