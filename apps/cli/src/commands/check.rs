//! Check command implementation.
//!
//! Validates pipeline configuration without calling any model.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

use threadsmith_core::{AgentsConfig, TasksConfig};
use threadsmith_crew::{web_search_tool, Crew, FirecrawlSearchHandler, FIRECRAWL_API_KEY_ENV};

/// Execute the check command.
pub fn execute(config_dir: &Path, json_output: bool) -> Result<()> {
    let agents_path = config_dir.join("agents.toml");
    let tasks_path = config_dir.join("tasks.toml");

    let agents_config = AgentsConfig::load(&agents_path)
        .with_context(|| format!("Failed to load {}", agents_path.display()))?;
    let tasks_config = TasksConfig::load(&tasks_path)
        .with_context(|| format!("Failed to load {}", tasks_path.display()))?;

    let tools = vec![web_search_tool(FirecrawlSearchHandler::new())];
    let crew = Crew::from_config(&agents_config, &tasks_config, &tools)?;

    let anthropic_key = std::env::var("ANTHROPIC_API_KEY").is_ok();
    let openai_key = std::env::var("OPENAI_API_KEY").is_ok();
    let firecrawl_key = std::env::var(FIRECRAWL_API_KEY_ENV).is_ok();

    if json_output {
        let report = json!({
            "agents": crew.agents().iter().map(|agent| json!({
                "key": agent.key,
                "role": agent.role,
                "tools": agent.tool_names(),
            })).collect::<Vec<_>>(),
            "tasks": crew.tasks().iter().map(|task| json!({
                "key": task.key,
                "agent": task.agent,
                "context": task.context,
                "output": task.output.to_string(),
            })).collect::<Vec<_>>(),
            "credentials": {
                "anthropic": anthropic_key,
                "openai": openai_key,
                "firecrawl": firecrawl_key,
            },
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", "Threadsmith configuration".bold().cyan());
    println!();

    println!("{}", "Agents:".bold());
    for agent in crew.agents() {
        let detail = if agent.has_tools() {
            format!("({}) tools: {}", agent.role, agent.tool_names().join(", "))
        } else {
            format!("({})", agent.role)
        };
        println!("  {} {} {}", "✓".green(), agent.key, detail.dimmed());
    }
    println!();

    println!("{}", "Tasks:".bold());
    for task in crew.tasks() {
        println!(
            "  {} {} {}",
            "✓".green(),
            task.key,
            format!("agent: {}, output: {}", task.agent, task.output).dimmed()
        );
    }
    println!();

    println!("{}", "Credentials:".bold());
    print_credential("ANTHROPIC_API_KEY", anthropic_key, "needed for --provider claude");
    print_credential("OPENAI_API_KEY", openai_key, "needed for --provider openai");
    print_credential(
        FIRECRAWL_API_KEY_ENV,
        firecrawl_key,
        "needed when the meme crafter searches",
    );
    println!();

    Ok(())
}

fn print_credential(name: &str, present: bool, note: &str) {
    if present {
        println!("  {} {}", "✓".green(), name);
    } else {
        println!("  {} {} {}", "⚠".yellow(), name, format!("not set, {note}").dimmed());
    }
}
