//! Agent Arena - Entry Point
//!
//! Summons two characters, generates combatants from their descriptions
//! and runs one battle, printing the transcript and the verdict.

use agent_arena::battle::{run_battle, Outcome};
use agent_arena::core::config::ArenaConfig;
use agent_arena::core::error::Result;
use agent_arena::entity::{create_from_description, summon, AlignmentRegistry, TomlTemplates};
use agent_arena::llm::client::LlmClient;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Agent Arena - reasoning-driven duels
#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Pit two described characters against each other")]
struct Args {
    /// TOML file of `name = "description"` character templates
    #[arg(long, default_value = "data/templates.toml")]
    templates: PathBuf,

    /// Template name of the first combatant (acts first)
    #[arg(long, default_value = "R")]
    first: String,

    /// Template name of the second combatant
    #[arg(long, default_value = "R")]
    second: String,

    /// Free-text description of the battlefield
    #[arg(long, default_value = "An open stone arena under a grey sky")]
    environment: String,

    /// Arena configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the round cap from the configuration
    #[arg(long)]
    max_rounds: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agent_arena=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(max_rounds) = args.max_rounds {
        config = config.with_max_rounds(max_rounds);
    }
    config.validate()?;

    let templates = TomlTemplates::load(&args.templates).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Templates unavailable, every summon uses the default hero");
        TomlTemplates::new()
    });

    let client = LlmClient::from_env()?;
    tracing::info!(model = client.model(), "Agent Arena starting...");

    let registry = AlignmentRegistry::standard();
    let first = create_from_description(&client, &registry, &summon(&templates, &args.first)).await?;
    let second =
        create_from_description(&client, &registry, &summon(&templates, &args.second)).await?;

    println!("\n=== AGENT ARENA ===");
    println!("{}\n", first.render_for_reasoning());
    println!("{}\n", second.render_for_reasoning());
    println!("Environment: {}\n", args.environment);

    let outcome = run_battle(&client, first, second, &args.environment, &config).await?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    for report in &outcome.reports {
        println!("--- Round {} ({}) ---", report.round, report.actor_name);
        if let Some(impression) = &report.impression {
            println!("  thinks: {}", impression);
        }
        if let Some(action) = &report.action {
            println!("  {}", action.narrate(report.round, &report.actor_name));
        }
        println!("  HP {} / MP {}", report.hp_after, report.mp_after);
    }

    println!();
    let health = outcome.health();
    for (combatant, report) in outcome.combatants.iter().zip(health.iter()) {
        println!(
            "{}: HP {}/{} ({:.0}%), lost {}",
            combatant.name,
            combatant.hp,
            combatant.max_hp(),
            report.hp_ratio * 100.0,
            report.hp_lost
        );
    }
    match outcome.winner() {
        Some(name) => println!(
            "\nWinner: {} after {} rounds ({:?})",
            name, outcome.rounds_played, outcome.reason
        ),
        None => println!("\nDraw after {} rounds", outcome.rounds_played),
    }
}
