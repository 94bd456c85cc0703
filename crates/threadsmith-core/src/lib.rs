//! Core data contracts and configuration for Threadsmith.
//!
//! Everything the pipeline produces flows through the types in [`schema`];
//! everything it is told to do comes from the declarative records in
//! [`config`]. Both are validated eagerly so a bad run fails before any
//! network call.

pub mod config;
pub mod schema;

pub use config::{
    AgentEntry, AgentsConfig, ConfigError, OutputKind, TaskEntry, TasksConfig,
};
pub use schema::{
    CandidateId, FinalOutput, Review, RunInputs, SchemaError, Score, ThreadCandidate,
    ViralBreakdown, ViralScore,
};
