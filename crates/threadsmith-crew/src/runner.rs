//! Sequential pipeline execution.
//!
//! The runner walks the four tasks in order, prompting one agent per task
//! and threading earlier outputs into later prompts. Models without native
//! function calling drive tools through a JSON protocol: a reply shaped
//! like `{"tool_calls": [{"tool": ..., "arguments": ...}]}` triggers tool
//! execution, anything else is the task's final answer.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use tokio::time::{Duration, timeout};
use tracing::{debug, info, warn};
use uuid::Uuid;

use threadsmith_abstraction::{ChatMessage, Model, ModelParameters};
use threadsmith_core::{FinalOutput, OutputKind, Review, RunInputs, ThreadCandidate, ViralScore};

use crate::agent::AgentSpec;
use crate::builders::Crew;
use crate::error::{CrewError, Result};
use crate::task::{TaskOutput, TaskSpec};
use crate::tool::ToolArguments;

/// One tool call requested by a model reply.
#[derive(Debug, Clone, Deserialize)]
struct ToolCallRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCallEnvelope {
    tool_calls: Vec<ToolCallRequest>,
}

/// Runner limits.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum tool round-trips per task before the run is aborted.
    pub max_tool_iterations: usize,
    /// Maximum wall-clock time for the whole run, in seconds.
    pub timeout_seconds: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { max_tool_iterations: 5, timeout_seconds: 300 }
    }
}

/// Executes a crew's task sequence against one model.
pub struct CrewRunner {
    model: Arc<dyn Model + Send + Sync>,
    config: RunnerConfig,
}

impl CrewRunner {
    /// Creates a runner with explicit limits.
    #[must_use]
    pub fn new(model: Arc<dyn Model + Send + Sync>, config: RunnerConfig) -> Self {
        Self { model, config }
    }

    /// Creates a runner with default limits.
    #[must_use]
    pub fn with_defaults(model: Arc<dyn Model + Send + Sync>) -> Self {
        Self::new(model, RunnerConfig::default())
    }

    /// Runs the full pipeline and assembles the final output.
    ///
    /// Tasks run strictly in sequence; any model, tool, or parse failure
    /// aborts the run. There are no retries.
    ///
    /// # Errors
    /// Returns an error if a task fails, a structured output does not
    /// parse, the assembled output violates the schema, or the run exceeds
    /// the configured timeout.
    pub async fn run(&self, crew: &Crew, inputs: &RunInputs) -> Result<FinalOutput> {
        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            topic = %inputs.topic,
            platform = %inputs.platform,
            audience = %inputs.target_audience,
            "Starting crew run"
        );

        let duration = Duration::from_secs(self.config.timeout_seconds);
        match timeout(duration, self.run_internal(crew, inputs, run_id)).await {
            Ok(result) => {
                if result.is_ok() {
                    info!(run_id = %run_id, "Crew run complete");
                }
                result
            }
            Err(_) => {
                warn!(
                    run_id = %run_id,
                    timeout_seconds = self.config.timeout_seconds,
                    "Crew run timed out"
                );
                Err(CrewError::Timeout(self.config.timeout_seconds))
            }
        }
    }

    async fn run_internal(
        &self,
        crew: &Crew,
        inputs: &RunInputs,
        run_id: Uuid,
    ) -> Result<FinalOutput> {
        let mut outputs: BTreeMap<String, TaskOutput> = BTreeMap::new();
        let mut candidates: Vec<ThreadCandidate> = Vec::new();
        let mut scores: Vec<ViralScore> = Vec::new();
        let mut review: Option<Review> = None;

        for task in crew.tasks() {
            let agent = crew.agent(&task.agent).ok_or_else(|| CrewError::UnknownAgent {
                task: task.key.clone(),
                agent: task.agent.clone(),
            })?;

            let output = self.run_task(task, agent, inputs, &outputs, run_id).await?;
            match &output {
                TaskOutput::Candidates(c) => candidates = c.clone(),
                TaskOutput::Scores(s) => scores = s.clone(),
                TaskOutput::Review(r) => review = Some(r.clone()),
                TaskOutput::Text(_) => {}
            }
            outputs.insert(task.key.clone(), output);
        }

        let review = review.ok_or_else(|| CrewError::MalformedTaskOutput {
            task: "review_and_judge".to_string(),
            expected: OutputKind::Review,
            reason: "pipeline produced no review".to_string(),
        })?;

        Ok(FinalOutput::new(inputs, candidates, scores, review)?)
    }

    async fn run_task(
        &self,
        task: &TaskSpec,
        agent: &AgentSpec,
        inputs: &RunInputs,
        prior: &BTreeMap<String, TaskOutput>,
        run_id: Uuid,
    ) -> Result<TaskOutput> {
        info!(run_id = %run_id, task = %task.key, agent = %agent.key, "Running task");

        let mut messages = vec![
            ChatMessage::system(Self::build_system_prompt(agent)),
            ChatMessage::user(Self::build_user_prompt(task, inputs, prior)?),
        ];

        let mut iterations = 0usize;
        loop {
            let response = self
                .model
                .generate_chat_completion(&messages, Some(ModelParameters::default()))
                .await?;

            if agent.has_tools() {
                if let Some(calls) = Self::parse_tool_calls(&response.content) {
                    if iterations >= self.config.max_tool_iterations {
                        warn!(
                            run_id = %run_id,
                            task = %task.key,
                            limit = self.config.max_tool_iterations,
                            "Tool iteration limit reached"
                        );
                        return Err(CrewError::ToolIterationsExceeded {
                            task: task.key.clone(),
                            limit: self.config.max_tool_iterations,
                        });
                    }
                    iterations += 1;

                    messages.push(ChatMessage::assistant(&response.content));
                    for call in calls {
                        let tool = agent.tool(&call.tool).ok_or_else(|| {
                            CrewError::ToolUnavailable {
                                task: task.key.clone(),
                                tool: call.tool.clone(),
                            }
                        })?;

                        debug!(
                            run_id = %run_id,
                            task = %task.key,
                            tool = %tool.name,
                            "Executing tool call"
                        );
                        let result = tool.execute(&ToolArguments::new(call.arguments)).await?;
                        messages.push(ChatMessage::user(format!(
                            "Tool '{}' returned:\n{}",
                            tool.name, result.output
                        )));
                    }
                    continue;
                }
            }

            debug!(
                run_id = %run_id,
                task = %task.key,
                response_chars = response.content.len(),
                "Task finished"
            );
            return Self::parse_task_output(task, &response.content);
        }
    }

    /// Persona prompt, plus the tool-call protocol when the agent holds
    /// any tools. Tool-less agents never see tool instructions.
    fn build_system_prompt(agent: &AgentSpec) -> String {
        let mut prompt = format!(
            "You are {}.\n\nGoal: {}\n\nBackstory: {}\n",
            agent.role, agent.goal, agent.backstory
        );

        if agent.has_tools() {
            prompt.push_str(
                "\nWhen you need to use a tool, respond ONLY with a JSON object in this exact format:\n\
                {\"tool_calls\": [{\"tool\": \"tool_name\", \"arguments\": {\"arg1\": \"value1\"}}]}\n\n\
                When you do not need a tool, respond with your final answer.\n\n\
                Available tools:\n\n",
            );
            for tool in &agent.tools {
                let _ = write!(
                    &mut prompt,
                    "Tool: {}\nDescription: {}\nParameters: {}\n\n",
                    tool.name,
                    tool.description,
                    serde_json::to_string_pretty(&tool.parameters).unwrap_or_default()
                );
            }
        }

        prompt
    }

    /// Rendered task description, context blocks from earlier tasks, and
    /// the output format the task must emit.
    fn build_user_prompt(
        task: &TaskSpec,
        inputs: &RunInputs,
        prior: &BTreeMap<String, TaskOutput>,
    ) -> Result<String> {
        let mut prompt = task.render_description(inputs);

        for dependency in &task.context {
            let output = prior.get(dependency).ok_or_else(|| CrewError::ContextOrder {
                task: task.key.clone(),
                dependency: dependency.clone(),
            })?;
            let _ = write!(&mut prompt, "\n\nOutput of task '{dependency}':\n{}", output.render());
        }

        let _ = write!(&mut prompt, "\n\nExpected output: {}", task.expected_output);

        if let Some(instruction) = Self::format_instruction(task.output) {
            let _ = write!(&mut prompt, "\n\n{instruction}");
        }

        Ok(prompt)
    }

    fn format_instruction(kind: OutputKind) -> Option<&'static str> {
        match kind {
            OutputKind::Text => None,
            OutputKind::ThreadCandidates => Some(
                "Respond ONLY with a JSON array of exactly three candidate objects, one per \
                 id \"conservative\", \"balanced\", and \"aggressive\". Each object has the \
                 fields \"id\", \"title\", \"body\" (array of post strings), \"memes\" (array \
                 of strings), \"cta\", and \"platform\".",
            ),
            OutputKind::ViralScores => Some(
                "Respond ONLY with a JSON array of score objects, one per candidate in the \
                 same order. Each object has the fields \"total\" (integer 0-100), \
                 \"breakdown\" (object with integer 0-100 fields \"hook\", \"novelty\", \
                 \"clarity\", \"shareability\", \"comment_bait\"), \"rationale\", and \
                 \"improvements\" (array of strings).",
            ),
            OutputKind::Review => Some(
                "Respond ONLY with one JSON object with the fields \"summary\", \
                 \"strengths\" (array of strings), \"weaknesses\" (array of strings), \
                 \"rewrites\" (object mapping each candidate id to a rewritten hook), \
                 \"final_recommendation\", and \"score_review\".",
            ),
        }
    }

    fn parse_tool_calls(content: &str) -> Option<Vec<ToolCallRequest>> {
        let envelope: ToolCallEnvelope =
            serde_json::from_str(Self::strip_code_fences(content)).ok()?;
        if envelope.tool_calls.is_empty() { None } else { Some(envelope.tool_calls) }
    }

    fn strip_code_fences(content: &str) -> &str {
        let trimmed = content.trim();
        let opened = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        opened.strip_suffix("```").unwrap_or(opened).trim()
    }

    fn parse_task_output(task: &TaskSpec, content: &str) -> Result<TaskOutput> {
        let payload = Self::strip_code_fences(content);
        let malformed = |reason: String| CrewError::MalformedTaskOutput {
            task: task.key.clone(),
            expected: task.output,
            reason,
        };

        match task.output {
            OutputKind::Text => Ok(TaskOutput::Text(content.trim().to_string())),
            OutputKind::ThreadCandidates => serde_json::from_str(payload)
                .map(TaskOutput::Candidates)
                .map_err(|e| malformed(e.to_string())),
            OutputKind::ViralScores => serde_json::from_str(payload)
                .map(TaskOutput::Scores)
                .map_err(|e| malformed(e.to_string())),
            OutputKind::Review => serde_json::from_str(payload)
                .map(TaskOutput::Review)
                .map_err(|e| malformed(e.to_string())),
        }
    }
}
