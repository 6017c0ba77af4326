//! # tp - dependency-aware task planner
//!
//! ## Quick Start
//!
//! ```bash
//! # Create tasks/tasks.json
//! tp init
//!
//! # Add work
//! tp add "Set up CI" --priority high --hours 3
//! tp add "Deploy" --depends-on 1 --due 2025-06-01
//!
//! # What should I do now?
//! tp next
//!
//! # Bucket the backlog and size the work
//! tp schedule
//! tp analyze-complexity && tp complexity-report
//! ```
//!
//! Defaults come from `taskplan.toml` in the working directory (or `--config`),
//! with `DEFAULT_PRIORITY` and `DEFAULT_SUBTASKS` read from the environment.
//! Set `RUST_LOG=debug` to see store and resolver diagnostics on stderr.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskplan::cli::Cli;
use taskplan::cmd::*;
use taskplan::config::PlannerConfig;
use taskplan::error::Result;

fn main() {
    // Warnings only unless RUST_LOG asks for more; invalid filters are ignored.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Completions need no config or task list.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let mut config = PlannerConfig::load(cli.config.as_deref())?;
    if let Some(file) = cli.file {
        config.tasks_file = file;
    }
    let ctx = Context::new(config);

    match cli.command {
        Commands::Init => cmd_init(&ctx),
        Commands::Add { title, description, details, priority, depends_on, hours, due } =>
            cmd_add(&ctx, title, description, details, priority, depends_on, hours, due),
        Commands::List { status } => cmd_list(&ctx, status),
        Commands::Show { id } => cmd_show(&ctx, id),
        Commands::SetStatus { id, status } => cmd_set_status(&ctx, id, status),
        Commands::Next => cmd_next(&ctx),
        Commands::Expand { id, num, force } => cmd_expand(&ctx, id, num, force),
        Commands::Schedule { hours_per_day, output } =>
            cmd_schedule(&ctx, hours_per_day, output),
        Commands::SetPriority { id, priority, update_schedule } =>
            cmd_set_priority(&ctx, id, priority, update_schedule),
        Commands::SetHours { id, hours, update_schedule } =>
            cmd_set_hours(&ctx, id, hours, update_schedule),
        Commands::SetDue { id, date, update_schedule } =>
            cmd_set_due(&ctx, id, date, update_schedule),
        Commands::AnalyzeComplexity { threshold, output } =>
            cmd_analyze_complexity(&ctx, threshold, output),
        Commands::ComplexityReport { input } => cmd_complexity_report(&ctx, input),
        Commands::Completions { .. } => Ok(()),
    }
}
