//! Run command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use threadsmith_core::{AgentsConfig, CandidateId, FinalOutput, RunInputs, TasksConfig};
use threadsmith_crew::{web_search_tool, Crew, CrewRunner, FirecrawlSearchHandler};
use threadsmith_models::{ModelConfig, ModelFactory, ModelType};

/// Execute the run command.
pub async fn execute(
    topic: String,
    platform: String,
    target_audience: String,
    config_dir: &Path,
    provider: &str,
    model: Option<String>,
    json: bool,
) -> Result<()> {
    let agents_path = config_dir.join("agents.toml");
    let tasks_path = config_dir.join("tasks.toml");

    let agents = AgentsConfig::load(&agents_path)
        .with_context(|| format!("Failed to load {}", agents_path.display()))?;
    let tasks = TasksConfig::load(&tasks_path)
        .with_context(|| format!("Failed to load {}", tasks_path.display()))?;

    let tools = vec![web_search_tool(FirecrawlSearchHandler::new())];
    let crew = Crew::from_config(&agents, &tasks, &tools)?;

    let model_type = provider.parse::<ModelType>().with_context(|| {
        format!("Unknown provider '{provider}' (expected claude, openai, or mock)")
    })?;
    let model_id = model.unwrap_or_else(|| model_type.default_model_id().to_string());
    let model = ModelFactory::create(ModelConfig::new(model_type, model_id))?;

    let runner = CrewRunner::with_defaults(model);
    let inputs = RunInputs::new(topic, platform, target_audience);

    let output = runner.run(&crew, &inputs).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_output(&output);
    }

    Ok(())
}

fn print_output(output: &FinalOutput) {
    println!();
    println!("{}", format!("Thread candidates: {}", output.topic).bold().cyan());
    println!(
        "  {}",
        format!("platform: {} | audience: {}", output.platform, output.target_audience).dimmed()
    );
    println!();

    for (candidate, score) in output.candidates.iter().zip(&output.scores) {
        let id_label = match candidate.id {
            CandidateId::Conservative => "conservative".green().bold(),
            CandidateId::Balanced => "balanced".yellow().bold(),
            CandidateId::Aggressive => "aggressive".red().bold(),
        };

        println!("  [{id_label}] {}", candidate.title.bold());
        for post in &candidate.body {
            println!("      {post}");
        }
        if !candidate.memes.is_empty() {
            println!("      {}", format!("memes: {}", candidate.memes.join(", ")).dimmed());
        }
        println!("      {}", format!("cta: {}", candidate.cta).dimmed());
        println!(
            "      {}",
            format!(
                "score {} | hook {} novelty {} clarity {} shareability {} comment-bait {}",
                score.total,
                score.breakdown.hook,
                score.breakdown.novelty,
                score.breakdown.clarity,
                score.breakdown.shareability,
                score.breakdown.comment_bait,
            )
            .dimmed()
        );
        println!("      {}", score.rationale.dimmed());
        for improvement in &score.improvements {
            println!("      {} {improvement}", "-".dimmed());
        }
        println!();
    }

    println!("{}", "Review".bold().cyan());
    println!("  {}", output.review.summary);
    for strength in &output.review.strengths {
        println!("  {} {strength}", "+".green());
    }
    for weakness in &output.review.weaknesses {
        println!("  {} {weakness}", "-".red());
    }
    println!();
    println!("  {}", "Rewritten hooks:".bold());
    for (id, rewrite) in &output.review.rewrites {
        println!("    {}: {rewrite}", id.to_string().bold());
    }
    println!();
    println!("  {}", output.review.final_recommendation.bold());
    println!("  {}", output.review.score_review.dimmed());
    println!();
}
