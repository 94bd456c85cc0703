//! Agent crew assembly and pipeline execution for Threadsmith.
//!
//! This crate turns the declarative records in `threadsmith-core` into a
//! runnable pipeline: six fixed roles, four fixed tasks, one model. There
//! is no agent registry and no global engine; [`build_agents`],
//! [`build_tasks`], and [`Crew::new`] are the only way a pipeline comes
//! into existence, and every capability an agent holds is granted
//! explicitly at construction.

pub mod agent;
pub mod builders;
pub mod error;
pub mod runner;
pub mod search;
pub mod task;
pub mod tool;

pub use agent::AgentSpec;
pub use builders::{build_agents, build_tasks, Crew, AGENT_KEYS, TASK_SEQUENCE};
pub use error::{CrewError, Result};
pub use runner::{CrewRunner, RunnerConfig};
pub use search::{
    web_search_tool, FirecrawlSearchHandler, FIRECRAWL_API_KEY_ENV, WEB_SEARCH_TOOL,
};
pub use task::{TaskOutput, TaskSpec};
pub use tool::{PropertySpec, Tool, ToolArguments, ToolHandler, ToolParameters, ToolResult};
