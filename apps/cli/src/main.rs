//! Threadsmith CLI - drafts, scores, and reviews social thread candidates.
//!
//! Provides a `threadsmith` command that drives the agent pipeline from
//! declarative TOML configuration.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Threadsmith CLI - multi-agent thread drafting pipeline
#[derive(Parser, Debug)]
#[command(
    name = "threadsmith",
    author,
    version,
    about = "Threadsmith - multi-agent thread drafting pipeline",
    long_about = "Threadsmith runs a fixed research, draft, score, review pipeline over \
                  configurable agent personas to produce three platform-ready thread \
                  candidates with virality scores and an editorial review."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline for a topic
    ///
    /// Loads agents.toml and tasks.toml from the config directory, assembles
    /// the crew, and runs research, drafting, scoring, and review in order.
    Run {
        /// Topic the threads are about
        #[arg(long)]
        topic: String,

        /// Target platform (e.g., "Twitter", "LinkedIn")
        #[arg(long)]
        platform: String,

        /// Audience the threads should land with
        #[arg(long = "audience")]
        target_audience: String,

        /// Directory holding agents.toml and tasks.toml
        #[arg(long, default_value = "config")]
        config_dir: PathBuf,

        /// Model provider (claude, openai, mock)
        #[arg(long, default_value = "claude")]
        provider: String,

        /// Model ID override (defaults per provider)
        #[arg(long)]
        model: Option<String>,

        /// Output the final result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and report credential status
    ///
    /// Builds the crew from configuration without calling any model, then
    /// reports the agent roster, task wiring, and which API keys are set.
    Check {
        /// Directory holding agents.toml and tasks.toml
        #[arg(long, default_value = "config")]
        config_dir: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Run { topic, platform, target_audience, config_dir, provider, model, json } => {
            commands::run::execute(topic, platform, target_audience, &config_dir, &provider, model, json)
                .await
        }
        Command::Check { config_dir, json } => commands::check::execute(&config_dir, json),
    }
}
