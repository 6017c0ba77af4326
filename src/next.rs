//! Next-task selection.
//!
//! Only ready tasks are candidates. Among them the explicit priority label
//! wins, then the lowest id.

use tracing::warn;

use crate::fields::Priority;
use crate::resolver::{find_cycle, ready_set};
use crate::task::{Task, TaskId};

/// Outcome of asking for the next task.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// A task to work on.
    Ready(&'a Task),
    /// Nothing left outside done/completed.
    AllComplete,
    /// Work remains but none of it can start yet.
    Blocked,
    /// Nothing can start because these tasks wait on each other.
    Cycle(Vec<TaskId>),
}

/// Rank used for ordering; lower goes first and unlabelled tasks go last.
///
/// `critical` ranks ahead of `high` so selection agrees with scoring.
pub fn priority_rank(priority: Option<Priority>) -> u32 {
    match priority {
        Some(Priority::Critical) => 0,
        Some(Priority::High) => 1,
        Some(Priority::Medium) => 2,
        Some(Priority::Low) => 3,
        None => 999,
    }
}

/// Order ready tasks by priority rank, then id.
pub fn order_candidates(ready: &mut [&Task]) {
    ready.sort_by(|a, b| {
        priority_rank(a.priority)
            .cmp(&priority_rank(b.priority))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Pick the task to surface next.
pub fn select_next(tasks: &[Task]) -> Selection<'_> {
    let mut ready = ready_set(tasks);
    if ready.is_empty() {
        if tasks.iter().all(|t| t.status.is_complete()) {
            return Selection::AllComplete;
        }
        return match find_cycle(tasks) {
            Some(cycle) => Selection::Cycle(cycle),
            None => Selection::Blocked,
        };
    }
    if let Some(cycle) = find_cycle(tasks) {
        let ids: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
        warn!(cycle = %ids.join(" -> "), "dependency cycle among remaining tasks");
    }
    order_candidates(&mut ready);
    Selection::Ready(ready[0])
}
