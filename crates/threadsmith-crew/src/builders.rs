// Crew assembly: fixed rosters, explicit builder functions, wiring checks
//
// The pipeline shape is fixed. Configuration supplies the words (personas,
// instructions) but never the structure: six named roles, four tasks in one
// order, each task locked to one output shape. Builders fail fast on any
// config that disagrees.

use threadsmith_core::{AgentsConfig, OutputKind, TasksConfig};
use tracing::debug;

use crate::agent::AgentSpec;
use crate::error::{CrewError, Result};
use crate::task::TaskSpec;
use crate::tool::Tool;

/// The six fixed agent keys every `agents.toml` must define.
pub const AGENT_KEYS: [&str; 6] = [
    "hooksmith",
    "debate_curator",
    "trend_spotter",
    "meme_crafter",
    "reply_driver",
    "quality_judge",
];

/// The four fixed tasks, in execution order, with the output shape each
/// one is required to declare.
pub const TASK_SEQUENCE: [(&str, OutputKind); 4] = [
    ("meme_research", OutputKind::Text),
    ("write_thread", OutputKind::ThreadCandidates),
    ("viral_score", OutputKind::ViralScores),
    ("review_and_judge", OutputKind::Review),
];

/// Constructs the six fixed roles from configuration records.
///
/// Each role's tool names are resolved against `available_tools`; granting a
/// tool that is not available is a construction error, so a role never ends
/// up silently without a capability its config promised.
///
/// # Errors
/// Returns an error if a fixed agent key is missing from the config or an
/// entry names an unknown tool.
pub fn build_agents(config: &AgentsConfig, available_tools: &[Tool]) -> Result<Vec<AgentSpec>> {
    let mut agents = Vec::with_capacity(AGENT_KEYS.len());

    for key in AGENT_KEYS {
        let entry = config.get(key)?;

        let mut tools = Vec::with_capacity(entry.tools.len());
        for tool_name in &entry.tools {
            let tool = available_tools
                .iter()
                .find(|t| &t.name == tool_name)
                .cloned()
                .ok_or_else(|| CrewError::UnknownTool {
                    agent: key.to_string(),
                    tool: tool_name.clone(),
                })?;
            tools.push(tool);
        }

        debug!(agent = %key, tools = ?entry.tools, "Built agent");
        agents.push(AgentSpec::new(key, entry, tools));
    }

    Ok(agents)
}

/// Constructs the four tasks in fixed order from configuration records.
///
/// # Errors
/// Returns an error if a fixed task key is missing, a task declares an
/// output shape other than the one the pipeline requires, or a context
/// reference points at a task that does not run earlier.
pub fn build_tasks(config: &TasksConfig) -> Result<Vec<TaskSpec>> {
    let mut tasks = Vec::with_capacity(TASK_SEQUENCE.len());

    for (position, (key, expected_output)) in TASK_SEQUENCE.iter().enumerate() {
        let entry = config.get(key)?;

        if entry.output != *expected_output {
            return Err(CrewError::WrongOutputKind {
                task: (*key).to_string(),
                expected: *expected_output,
                declared: entry.output,
            });
        }

        for dependency in &entry.context {
            let dependency_position =
                TASK_SEQUENCE.iter().position(|(task_key, _)| task_key == dependency);
            match dependency_position {
                Some(earlier) if earlier < position => {}
                _ => {
                    return Err(CrewError::ContextOrder {
                        task: (*key).to_string(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        debug!(task = %key, agent = %entry.agent, context = ?entry.context, "Built task");
        tasks.push(TaskSpec::new(*key, entry));
    }

    Ok(tasks)
}

/// An assembled pipeline: agents plus the ordered task sequence, wiring
/// validated.
#[derive(Debug, Clone)]
pub struct Crew {
    agents: Vec<AgentSpec>,
    tasks: Vec<TaskSpec>,
}

impl Crew {
    /// Validates the wiring and assembles the crew.
    ///
    /// # Errors
    /// Returns `CrewError::UnknownAgent` if a task names an agent that was
    /// not built.
    pub fn new(agents: Vec<AgentSpec>, tasks: Vec<TaskSpec>) -> Result<Self> {
        for task in &tasks {
            if !agents.iter().any(|agent| agent.key == task.agent) {
                return Err(CrewError::UnknownAgent {
                    task: task.key.clone(),
                    agent: task.agent.clone(),
                });
            }
        }

        Ok(Self { agents, tasks })
    }

    /// Builds agents and tasks from config and assembles the crew.
    ///
    /// # Errors
    /// Returns any builder or wiring error.
    pub fn from_config(
        agents_config: &AgentsConfig,
        tasks_config: &TasksConfig,
        available_tools: &[Tool],
    ) -> Result<Self> {
        let agents = build_agents(agents_config, available_tools)?;
        let tasks = build_tasks(tasks_config)?;
        Self::new(agents, tasks)
    }

    /// The six agents, in roster order.
    #[must_use]
    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    /// The four tasks, in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Looks up an agent by key.
    #[must_use]
    pub fn agent(&self, key: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|agent| agent.key == key)
    }
}
