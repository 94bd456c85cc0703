// Task value objects and their runtime outputs

use threadsmith_core::{OutputKind, Review, RunInputs, TaskEntry, ThreadCandidate, ViralScore};

/// One unit of work in the pipeline, bound to an agent.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Stable config key (e.g., "write_thread").
    pub key: String,
    /// Instruction template. May contain `{topic}`, `{platform}`, and
    /// `{target_audience}` placeholders.
    pub description: String,
    /// Prose description of the expected result, shown to the agent.
    pub expected_output: String,
    /// Key of the agent that executes this task.
    pub agent: String,
    /// Keys of earlier tasks whose outputs this task consumes.
    pub context: Vec<String>,
    /// The record shape the task must emit.
    pub output: OutputKind,
}

impl TaskSpec {
    /// Builds a task from its config record.
    #[must_use]
    pub fn new(key: impl Into<String>, entry: &TaskEntry) -> Self {
        Self {
            key: key.into(),
            description: entry.description.clone(),
            expected_output: entry.expected_output.clone(),
            agent: entry.agent.clone(),
            context: entry.context.clone(),
            output: entry.output,
        }
    }

    /// Interpolates the run inputs into the instruction template.
    #[must_use]
    pub fn render_description(&self, inputs: &RunInputs) -> String {
        self.description
            .replace("{topic}", &inputs.topic)
            .replace("{platform}", &inputs.platform)
            .replace("{target_audience}", &inputs.target_audience)
    }
}

/// The typed result one task produced at runtime.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    /// Free-form text (research notes).
    Text(String),
    /// Drafted thread candidates.
    Candidates(Vec<ThreadCandidate>),
    /// Index-aligned virality scores.
    Scores(Vec<ViralScore>),
    /// The judge's verdict.
    Review(Review),
}

impl TaskOutput {
    /// Which declared shape this output satisfies.
    #[must_use]
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Text(_) => OutputKind::Text,
            Self::Candidates(_) => OutputKind::ThreadCandidates,
            Self::Scores(_) => OutputKind::ViralScores,
            Self::Review(_) => OutputKind::Review,
        }
    }

    /// Renders the output for inclusion in a downstream task's prompt.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Candidates(candidates) => {
                serde_json::to_string_pretty(candidates).unwrap_or_default()
            }
            Self::Scores(scores) => serde_json::to_string_pretty(scores).unwrap_or_default(),
            Self::Review(review) => serde_json::to_string_pretty(review).unwrap_or_default(),
        }
    }
}
