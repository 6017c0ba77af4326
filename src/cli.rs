use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Dependency-aware task planner.
/// Storage defaults to ./tasks/tasks.json or a path passed via --file.
#[derive(Parser)]
#[command(name = "tp", version, about = "Pick the next task, schedule the backlog, size the work")]
pub struct Cli {
    /// Path to the JSON task list.
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Path to a taskplan.toml config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
