// Agent value objects
//
// An agent is a named role with persona text and an explicit capability set,
// fixed at construction. There is no registry: whoever builds the agent
// decides which tools it holds.

use threadsmith_core::AgentEntry;

use crate::tool::Tool;

/// A configured role the pipeline can assign tasks to.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Stable config key (e.g., "meme_crafter").
    pub key: String,
    /// Display name of the role.
    pub role: String,
    /// What the agent is trying to achieve.
    pub goal: String,
    /// Persona text shaping how the agent writes.
    pub backstory: String,
    /// The capabilities this agent holds. Usually empty.
    pub tools: Vec<Tool>,
}

impl AgentSpec {
    /// Builds an agent from its config record and resolved tools.
    #[must_use]
    pub fn new(key: impl Into<String>, entry: &AgentEntry, tools: Vec<Tool>) -> Self {
        Self {
            key: key.into(),
            role: entry.role.clone(),
            goal: entry.goal.clone(),
            backstory: entry.backstory.clone(),
            tools,
        }
    }

    /// Looks up one of this agent's tools by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Whether this agent holds any capability at all.
    #[must_use]
    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Names of the tools this agent holds.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ToolArguments, ToolHandler, ToolParameters, ToolResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopHandler;

    #[async_trait]
    impl ToolHandler for NoopHandler {
        async fn execute(&self, _args: &ToolArguments) -> crate::error::Result<ToolResult> {
            Ok(ToolResult::new("ok"))
        }
    }

    fn entry() -> AgentEntry {
        AgentEntry {
            role: "Meme Crafter".to_string(),
            goal: "Find meme formats that fit".to_string(),
            backstory: "You live in the replies.".to_string(),
            tools: vec!["web_search".to_string()],
        }
    }

    #[test]
    fn test_agent_spec_from_entry() {
        let tool = Tool::new("web_search", "Search the web", ToolParameters::new(), Arc::new(NoopHandler));
        let agent = AgentSpec::new("meme_crafter", &entry(), vec![tool]);

        assert_eq!(agent.key, "meme_crafter");
        assert_eq!(agent.role, "Meme Crafter");
        assert!(agent.has_tools());
        assert!(agent.tool("web_search").is_some());
        assert!(agent.tool("file_write").is_none());
        assert_eq!(agent.tool_names(), vec!["web_search"]);
    }

    #[test]
    fn test_agent_spec_without_tools() {
        let agent = AgentSpec::new("hooksmith", &entry(), vec![]);
        assert!(!agent.has_tools());
    }
}
