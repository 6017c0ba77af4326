//! Complexity estimation.
//!
//! A quick heuristic: long descriptions, long implementation details, many
//! dependencies and a high priority each push the 1–10 score up from a
//! neutral 5. The score drives how many subtasks a task should be split into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::fields::{Priority, Status};
use crate::task::{Task, TaskId};

pub const MIN_COMPLEXITY: u8 = 1;
pub const MAX_COMPLEXITY: u8 = 10;

/// Estimate how hard a task is, in `1..=10`.
pub fn estimate_complexity(task: &Task) -> u8 {
    let mut complexity: i32 = 5;

    let description_len = task.description.chars().count();
    if description_len > 500 {
        complexity += 1;
    }
    if description_len > 1000 {
        complexity += 1;
    }

    let details_len = task.details.as_deref().map_or(0, |d| d.chars().count());
    if details_len > 1000 {
        complexity += 1;
    }
    if details_len > 2000 {
        complexity += 1;
    }

    let dependency_count = task.dependencies.len();
    if dependency_count > 2 {
        complexity += 1;
    }
    if dependency_count > 5 {
        complexity += 1;
    }

    if task.priority == Some(Priority::High) {
        complexity += 1;
    }

    complexity.clamp(MIN_COMPLEXITY as i32, MAX_COMPLEXITY as i32) as u8
}

/// Subtasks to aim for, stepping up from `base` with complexity.
pub fn recommended_subtask_count(complexity: u8, base: u32) -> u32 {
    match complexity {
        0..=3 => base.saturating_sub(1).max(1),
        4..=6 => base,
        7..=8 => base.saturating_add(1),
        _ => base.saturating_add(2),
    }
}

/// Guidance for breaking a task down, by complexity band.
pub fn expansion_prompt(complexity: u8) -> &'static str {
    match complexity {
        0..=3 => "Break down this simple task into clear steps, focusing on implementation details.",
        4..=7 => "Divide this moderately complex task into logical components, considering both implementation and testing.",
        _ => "Break down this highly complex task into manageable subtasks, addressing technical challenges, edge cases, and thorough testing.",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub subtask_count: u32,
    pub needs_expansion: bool,
    pub expansion_prompt: String,
    pub expansion_command: String,
}

/// Per-task entry of a complexity report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComplexity {
    pub task_id: TaskId,
    pub title: String,
    pub status: Status,
    pub complexity: u8,
    pub has_subtasks: bool,
    pub subtask_count: usize,
    pub recommended: Recommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityStats {
    pub total_tasks: usize,
    pub active_tasks: usize,
    pub low_complexity: usize,
    pub medium_complexity: usize,
    pub high_complexity: usize,
    pub average_complexity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub timestamp: DateTime<Utc>,
    pub stats: ComplexityStats,
    pub tasks: Vec<TaskComplexity>,
}

impl ComplexityReport {
    /// Entries flagged for expansion, most complex first.
    pub fn needing_expansion(&self) -> impl Iterator<Item = &TaskComplexity> {
        self.tasks.iter().filter(|t| t.recommended.needs_expansion)
    }
}

/// Assess one task.
pub fn assess(task: &Task, threshold: u8, base_subtasks: u32) -> TaskComplexity {
    let complexity = estimate_complexity(task);
    let subtask_count = recommended_subtask_count(complexity, base_subtasks);
    TaskComplexity {
        task_id: task.id.clone(),
        title: task.title.clone(),
        status: task.status,
        complexity,
        has_subtasks: !task.subtasks.is_empty(),
        subtask_count: task.subtasks.len(),
        recommended: Recommendation {
            subtask_count,
            needs_expansion: complexity >= threshold,
            expansion_prompt: expansion_prompt(complexity).to_string(),
            expansion_command: format!("tp expand {} --num {}", task.id, subtask_count),
        },
    }
}

/// Aggregate counts and mean over the assessed tasks that are still active.
pub fn stats(results: &[TaskComplexity]) -> ComplexityStats {
    let active: Vec<u8> = results
        .iter()
        .filter(|r| !r.status.is_complete())
        .map(|r| r.complexity)
        .collect();
    if active.is_empty() {
        return ComplexityStats {
            total_tasks: results.len(),
            ..ComplexityStats::default()
        };
    }
    let sum: u32 = active.iter().map(|&c| c as u32).sum();
    ComplexityStats {
        total_tasks: results.len(),
        active_tasks: active.len(),
        low_complexity: active.iter().filter(|&&c| c <= 3).count(),
        medium_complexity: active.iter().filter(|&&c| (4..=7).contains(&c)).count(),
        high_complexity: active.iter().filter(|&&c| c > 7).count(),
        average_complexity: sum as f64 / active.len() as f64,
    }
}

/// Analyse every task that is not complete and build the report.
///
/// `threshold` overrides `config.complexity_threshold` when given.
pub fn analyze(
    tasks: &[Task],
    config: &PlannerConfig,
    threshold: Option<u8>,
    timestamp: DateTime<Utc>,
) -> ComplexityReport {
    let threshold = threshold.unwrap_or(config.complexity_threshold);
    let mut results: Vec<TaskComplexity> = tasks
        .iter()
        .filter(|t| !t.status.is_complete())
        .map(|t| assess(t, threshold, config.default_subtasks))
        .collect();
    let stats = stats(&results);
    results.sort_by(|a, b| b.complexity.cmp(&a.complexity));
    ComplexityReport {
        timestamp,
        stats,
        tasks: results,
    }
}
