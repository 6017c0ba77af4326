//! Command implementations for the CLI interface.
//!
//! This module contains the subcommand definitions and their handlers, from
//! the basic task edits to next-task selection, scheduling and complexity
//! analysis. Handlers load one snapshot of the task list, work on it in
//! memory and save at most once.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::complexity::{self, estimate_complexity, recommended_subtask_count, ComplexityReport};
use crate::config::PlannerConfig;
use crate::db::*;
use crate::error::{Error, Result};
use crate::expand::generate_subtasks;
use crate::fields::*;
use crate::next::{select_next, Selection};
use crate::schedule::{build_schedule, due_badge, Horizon, Schedule};
use crate::scoring::prioritize;
use crate::task::{Task, TaskId};

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty task list if none exists.
    Init,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Longer description.
        #[arg(long)]
        description: Option<String>,
        /// Implementation details.
        #[arg(long)]
        details: Option<String>,
        /// Priority: critical | high | medium | low.
        #[arg(long)]
        priority: Option<String>,
        /// Task IDs this task depends on. May be repeated or comma-separated.
        #[arg(long = "depends-on", value_delimiter = ',')]
        depends_on: Vec<TaskId>,
        /// Estimated hours (positive number).
        #[arg(long)]
        hours: Option<String>,
        /// Due date: YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks.
    List {
        /// Only show tasks with this status.
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Show a single task.
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Set a task's status.
    SetStatus {
        /// Task ID
        id: TaskId,
        /// New status: pending | in_progress | blocked | deferred | done | completed.
        #[arg(value_enum)]
        status: Status,
    },

    /// Show the next task to work on.
    Next,

    /// Break a task into subtasks.
    Expand {
        /// Task ID
        id: TaskId,
        /// Number of subtasks (default: recommended from complexity).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
        num: Option<u32>,
        /// Replace existing subtasks.
        #[arg(long)]
        force: bool,
    },

    /// Prioritise active tasks into time horizons and save the schedule.
    Schedule {
        /// Productive hours per day used for planning.
        #[arg(long)]
        hours_per_day: Option<f64>,
        /// Where to write the schedule JSON.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Set a task's priority.
    SetPriority {
        /// Task ID
        id: TaskId,
        /// critical | high | medium | low
        priority: String,
        /// Regenerate the schedule afterwards.
        #[arg(long)]
        update_schedule: bool,
    },

    /// Set a task's estimated hours.
    SetHours {
        /// Task ID
        id: TaskId,
        /// Positive number of hours.
        hours: String,
        /// Regenerate the schedule afterwards.
        #[arg(long)]
        update_schedule: bool,
    },

    /// Set a task's due date.
    SetDue {
        /// Task ID
        id: TaskId,
        /// Due date: YYYY-MM-DD.
        date: String,
        /// Regenerate the schedule afterwards.
        #[arg(long)]
        update_schedule: bool,
    },

    /// Score every active task's complexity and save a report.
    AnalyzeComplexity {
        /// Complexity (1-10) at or above which a task needs expansion.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        threshold: Option<u8>,
        /// Where to write the report JSON.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Display a saved complexity report.
    ComplexityReport {
        /// Report file (default from config).
        #[arg(long, short)]
        input: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Everything a handler needs: the store, the planner defaults, and the date
/// the plan is made for.
pub struct Context {
    pub store: TaskStore,
    pub config: PlannerConfig,
    pub today: NaiveDate,
}

impl Context {
    pub fn new(config: PlannerConfig) -> Self {
        Context {
            store: TaskStore::new(config.tasks_file.clone()),
            today: Local::now().date_naive(),
            config,
        }
    }
}

/// Create the task list file.
pub fn cmd_init(ctx: &Context) -> Result<()> {
    if ctx.store.init()? {
        println!("Created empty task list: {}", ctx.store.path().display());
    } else {
        println!("Task list already exists: {}", ctx.store.path().display());
    }
    Ok(())
}

/// Add a new task to the list.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    ctx: &Context,
    title: String,
    description: Option<String>,
    details: Option<String>,
    priority: Option<String>,
    depends_on: Vec<TaskId>,
    hours: Option<String>,
    due: Option<String>,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("Task title cannot be empty".into()));
    }
    let priority = priority.as_deref().map(str::parse::<Priority>).transpose()?;
    let hours = hours.as_deref().map(parse_hours_input).transpose()?;
    let due = due.as_deref().map(parse_due_input).transpose()?;

    let mut snapshot = ctx.store.load()?;
    let id = snapshot.next_id();
    for dep in &depends_on {
        if snapshot.get(dep).is_none() {
            warn!(task = id, dependency = %dep, "dependency does not exist yet");
            println!("Note: dependency {dep} does not exist yet; task {id} stays blocked until it does.");
        }
    }

    let mut task = Task::new(id, title.trim());
    task.description = description.unwrap_or_default();
    task.details = details;
    task.priority = priority;
    task.dependencies = depends_on;
    task.estimated_hours = hours;
    task.due_date = due;
    task.created_at = Some(Utc::now());
    snapshot.tasks.push(task);
    ctx.store.save(&mut snapshot)?;
    info!(task = id, "task added");
    println!("Added task {id}");
    Ok(())
}

/// List tasks, optionally filtered by status.
pub fn cmd_list(ctx: &Context, status: Option<Status>) -> Result<()> {
    let snapshot = ctx.store.load()?;
    let filtered: Vec<&Task> = snapshot
        .tasks
        .iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .collect();
    if filtered.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    print_table(&filtered, ctx.today, ctx.config.default_priority);
    println!("\nTotal: {} tasks", filtered.len());
    Ok(())
}

/// Show detailed information about a task.
pub fn cmd_show(ctx: &Context, id: TaskId) -> Result<()> {
    let snapshot = ctx.store.load()?;
    let task = snapshot.require(&id)?;
    print_task_detail(ctx, &snapshot.tasks, task);
    Ok(())
}

fn print_task_detail(ctx: &Context, tasks: &[Task], task: &Task) {
    println!("\nTask #{}: {}", task.id, task.title);
    println!("------------------");
    println!("Status:       {}", task.status);
    println!(
        "Priority:     {}",
        format_priority(task.priority, ctx.config.default_priority)
    );
    println!(
        "Estimate:     {}",
        task.estimated_hours
            .map(|h| format!("{}h", format_hours(h)))
            .unwrap_or_else(|| "-".into())
    );
    println!(
        "Due:          {}",
        match task.due_date {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), ctx.today)),
            None => "-".into(),
        }
    );
    if !task.dependencies.is_empty() {
        let deps: Vec<String> = task
            .dependencies
            .iter()
            .map(|dep| match tasks.iter().find(|t| &t.id == dep) {
                Some(t) => format!("{dep} ({})", t.status),
                None => format!("{dep} (missing)"),
            })
            .collect();
        println!("Dependencies: {}", deps.join(", "));
    }
    println!("Complexity:   {}/10", estimate_complexity(task));
    println!(
        "\nDescription:\n{}",
        if task.description.is_empty() { "-" } else { task.description.as_str() }
    );
    if let Some(details) = &task.details {
        println!("\nDetails:\n{details}");
    }
    if let Some(strategy) = &task.test_strategy {
        println!("\nTest Strategy:\n{strategy}");
    }
    if !task.subtasks.is_empty() {
        println!("\nSubtasks:");
        for s in &task.subtasks {
            let status = if s.done == Some(true) { Status::Done } else { s.status };
            println!("  [{}] {} - {}", s.id, s.title, status);
        }
    }
    println!("------------------\n");
}

/// Change a task's status.
pub fn cmd_set_status(ctx: &Context, id: TaskId, status: Status) -> Result<()> {
    let mut snapshot = ctx.store.load()?;
    let task = snapshot.require_mut(&id)?;
    let old = task.status;
    task.status = status;
    if status.is_complete() {
        task.completed_at = Some(Utc::now());
    } else {
        task.completed_at = None;
    }
    ctx.store.save(&mut snapshot)?;
    println!("Task #{id} status updated from \"{old}\" to \"{status}\".");
    Ok(())
}

/// Show the next task to work on.
pub fn cmd_next(ctx: &Context) -> Result<()> {
    let snapshot = ctx.store.load()?;
    match select_next(&snapshot.tasks) {
        Selection::Ready(task) => {
            print_task_detail(ctx, &snapshot.tasks, task);
            println!("Suggested commands:");
            println!("  Start working on this task: tp set-status {} in_progress", task.id);
            println!("  Mark as completed: tp set-status {} done", task.id);
            if task.subtasks.is_empty() {
                println!("  Expand into subtasks: tp expand {}", task.id);
            }
            Ok(())
        }
        Selection::AllComplete => {
            if snapshot.tasks.is_empty() {
                println!("No tasks found. Add one with: tp add \"<title>\"");
            } else {
                println!("No available tasks: every task is complete.");
            }
            Ok(())
        }
        Selection::Blocked => {
            println!("No available tasks found. Remaining tasks are in progress, blocked, deferred or waiting on unfinished dependencies.");
            println!("Run `tp list` to review them.");
            Ok(())
        }
        Selection::Cycle(ids) => Err(Error::CyclicDependency(ids)),
    }
}

/// Generate subtasks for a task.
pub fn cmd_expand(ctx: &Context, id: TaskId, num: Option<u32>, force: bool) -> Result<()> {
    let mut snapshot = ctx.store.load()?;
    let task = snapshot.require_mut(&id)?;

    if !task.subtasks.is_empty() && !force {
        println!("Task #{id} already has {} subtasks.", task.subtasks.len());
        println!("Use --force to regenerate subtasks.\n");
        println!("Current subtasks:");
        for s in &task.subtasks {
            println!("  [{}] {} - {}", s.id, s.title, s.status);
        }
        return Ok(());
    }

    let complexity = estimate_complexity(task);
    let count = num
        .unwrap_or_else(|| recommended_subtask_count(complexity, ctx.config.default_subtasks));
    println!("Generating {count} subtasks for Task #{id}...");
    let generated = generate_subtasks(task, count, Utc::now());
    task.subtasks = generated.clone();
    ctx.store.save(&mut snapshot)?;

    println!("\nGenerated {} subtasks for Task #{id}:", generated.len());
    for s in &generated {
        println!("  [{}] {}", s.id, s.title);
        println!("    {}", s.description);
    }
    Ok(())
}

/// Build, save and print the schedule.
pub fn cmd_schedule(
    ctx: &Context,
    hours_per_day: Option<f64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(h) = hours_per_day {
        if !(h.is_finite() && h > 0.0) {
            return Err(Error::Validation(
                "Hours per day must be a positive number.".into(),
            ));
        }
        config.hours_per_day = h;
    }
    let output = output.unwrap_or_else(|| config.schedule_file.clone());

    println!("Scheduling tasks...");
    let snapshot = ctx.store.load()?;
    if snapshot.tasks.is_empty() {
        println!("No tasks found to schedule. Add one with: tp add \"<title>\"");
        return Ok(());
    }

    let scored = prioritize(&snapshot.tasks, ctx.today, &config);
    let schedule = build_schedule(&scored, &config, ctx.today, Utc::now());
    write_json_atomic(&output, &schedule)?;
    println!("Task schedule created and saved to {}", output.display());

    print_schedule(&schedule);
    Ok(())
}

fn print_schedule(schedule: &Schedule) {
    println!("\nTask Schedule");
    println!(
        "Generated: {}",
        schedule.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!("Today: {}", schedule.today);
    println!("Tasks: {} total", schedule.total_tasks);
    println!(
        "Planning with {} productive hours per day",
        format_hours(schedule.hours_per_day)
    );

    for horizon in Horizon::ALL {
        let bucket = schedule.bucket(horizon);
        println!(
            "\n{}: {} tasks, {}h (~{:.1} days)",
            horizon.heading(),
            bucket.count,
            format_hours(bucket.estimated_hours),
            schedule.working_days(horizon)
        );
        if horizon == Horizon::Backlog {
            continue;
        }
        if bucket.tasks.is_empty() {
            println!("  No tasks in this category.");
            continue;
        }
        for t in &bucket.tasks {
            let due = t
                .due_date
                .map(|d| format!(" {}", due_badge(d, schedule.today)))
                .unwrap_or_default();
            println!(
                "  [{}] {} ~{}h (score {}){}",
                t.id,
                t.title,
                format_hours(t.estimated_hours),
                t.priority_score,
                due
            );
            if t.has_dependencies {
                let deps: Vec<String> = t.dependencies.iter().map(|d| d.to_string()).collect();
                println!("    Depends on: {}", deps.join(", "));
            }
        }
    }
}

/// Set a task's priority.
pub fn cmd_set_priority(
    ctx: &Context,
    id: TaskId,
    priority: String,
    update_schedule: bool,
) -> Result<()> {
    let priority: Priority = priority.parse()?;
    let mut snapshot = ctx.store.load()?;
    let task = snapshot.require_mut(&id)?;
    let old = task.priority.unwrap_or(ctx.config.default_priority);
    task.priority = Some(priority);
    ctx.store.save(&mut snapshot)?;
    println!("Task {id} priority updated from {old} to {priority}.");
    reschedule_if(ctx, update_schedule)
}

/// Set a task's estimated hours.
pub fn cmd_set_hours(ctx: &Context, id: TaskId, hours: String, update_schedule: bool) -> Result<()> {
    let hours = parse_hours_input(&hours)?;
    let mut snapshot = ctx.store.load()?;
    let task = snapshot.require_mut(&id)?;
    let old = task
        .estimated_hours
        .map(format_hours)
        .unwrap_or_else(|| "unspecified".into());
    task.estimated_hours = Some(hours);
    ctx.store.save(&mut snapshot)?;
    println!(
        "Task {id} estimated hours updated from {old} to {}.",
        format_hours(hours)
    );
    reschedule_if(ctx, update_schedule)
}

/// Set a task's due date.
pub fn cmd_set_due(ctx: &Context, id: TaskId, date: String, update_schedule: bool) -> Result<()> {
    let due = parse_due_input(&date)?;
    let mut snapshot = ctx.store.load()?;
    let task = snapshot.require_mut(&id)?;
    let old = task
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unspecified".into());
    task.due_date = Some(due);
    ctx.store.save(&mut snapshot)?;
    println!("Task {id} due date updated from {old} to {due}.");
    reschedule_if(ctx, update_schedule)
}

fn reschedule_if(ctx: &Context, update_schedule: bool) -> Result<()> {
    if update_schedule {
        cmd_schedule(ctx, None, None)?;
    }
    Ok(())
}

/// Analyse complexity of all active tasks and save the report.
pub fn cmd_analyze_complexity(
    ctx: &Context,
    threshold: Option<u8>,
    output: Option<PathBuf>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| ctx.config.complexity_report_file.clone());
    println!("Analyzing task complexity...");
    let snapshot = ctx.store.load()?;
    if snapshot.tasks.is_empty() {
        println!("No tasks found to analyze. Add one with: tp add \"<title>\"");
        return Ok(());
    }

    let report = complexity::analyze(&snapshot.tasks, &ctx.config, threshold, Utc::now());
    write_json_atomic(&output, &report)?;
    println!(
        "Complexity analysis complete. Report saved to {}",
        output.display()
    );
    println!(
        "Found {} high complexity tasks.",
        report.stats.high_complexity
    );
    Ok(())
}

/// Print a saved complexity report.
pub fn cmd_complexity_report(ctx: &Context, input: Option<PathBuf>) -> Result<()> {
    let path = input.unwrap_or_else(|| ctx.config.complexity_report_file.clone());
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No complexity report found at {}.", path.display());
            println!("Run `tp analyze-complexity` to generate a report.");
            return Ok(());
        }
        Err(e) => return Err(Error::store(&path, e)),
    };
    let report: ComplexityReport = serde_json::from_str(&content)?;
    print_complexity_report(&report);
    Ok(())
}

fn print_complexity_report(report: &ComplexityReport) {
    println!("\nTask Complexity Report");
    println!(
        "Generated: {}\n",
        report.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );

    println!("Complexity Distribution:");
    println!("  Low Complexity (1-3): {} tasks", report.stats.low_complexity);
    println!("  Medium Complexity (4-7): {} tasks", report.stats.medium_complexity);
    println!("  High Complexity (8-10): {} tasks", report.stats.high_complexity);
    println!("  Average Complexity: {:.1}\n", report.stats.average_complexity);

    println!("Tasks Needing Expansion:");
    let mut any = false;
    for t in report.needing_expansion() {
        any = true;
        println!("  Task {}: {}", t.task_id, t.title);
        println!("    Complexity: {}/10", t.complexity);
        println!("    Recommended Subtasks: {}", t.recommended.subtask_count);
        println!("    {}", t.recommended.expansion_prompt);
        println!("    Run: {}", t.recommended.expansion_command);
    }
    if !any {
        println!("  No tasks found that need expansion.");
    }

    println!("\nAll Tasks by Complexity:");
    for t in &report.tasks {
        println!("  Task {}: {}/10 - {}", t.task_id, t.complexity, t.title);
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut command = Cli::command();
    let bin = command.get_name().to_string();
    generate(shell, &mut command, bin, &mut std::io::stdout().lock());
}
