//! Priority scoring.
//!
//! Every active task gets an urgency score in `0..=100` built from its priority
//! label, how many other tasks wait on it, its size, its due date and whether
//! work has already started. Scores are derived on demand and never written
//! back to the task list.

use chrono::NaiveDate;

use crate::config::PlannerConfig;
use crate::fields::{Priority, Status};
use crate::task::Task;

pub const MAX_SCORE: u8 = 100;

const BASE_SCORE: i32 = 50;
const DEPENDED_ON_BONUS: i32 = 10;
const PER_DEPENDENT_BONUS: i32 = 5;
const MAX_DEPENDENT_BONUS: i32 = 20;
const QUICK_WIN_HOURS: f64 = 2.0;
const QUICK_WIN_BONUS: i32 = 5;
const IN_PROGRESS_BONUS: i32 = 15;

/// A task paired with its derived score. Borrowed, so it cannot be persisted.
#[derive(Debug, Clone, Copy)]
pub struct ScoredTask<'a> {
    pub task: &'a Task,
    pub score: u8,
}

/// Bonus for an explicit priority label.
pub fn priority_bonus(priority: Priority) -> i32 {
    match priority {
        Priority::Critical => 40,
        Priority::High => 30,
        Priority::Medium => 15,
        Priority::Low => 5,
    }
}

/// Bonus for a task without a label, keyed by the configured default.
///
/// Only `high` and `medium` defaults map to their label bonus; any other
/// default, `critical` included, gets the low bonus.
pub fn default_priority_bonus(default: Priority) -> i32 {
    match default {
        Priority::High => 30,
        Priority::Medium => 15,
        Priority::Critical | Priority::Low => 5,
    }
}

/// Bonus for due-date proximity, in whole days from `today`.
pub fn due_bonus(due: NaiveDate, today: NaiveDate) -> i32 {
    let days_until_due = (due - today).num_days();
    match days_until_due {
        d if d < 0 => 50,
        d if d <= 1 => 40,
        d if d <= 3 => 30,
        d if d <= 7 => 20,
        _ => 0,
    }
}

/// Score one task against the set of active (not completed) tasks.
pub fn score(task: &Task, active: &[&Task], today: NaiveDate, config: &PlannerConfig) -> u8 {
    let mut score = BASE_SCORE;

    score += match task.priority {
        Some(priority) => priority_bonus(priority),
        None => default_priority_bonus(config.default_priority),
    };

    let dependents = active
        .iter()
        .filter(|t| t.id != task.id && t.depends_on(&task.id))
        .count() as i32;
    if dependents > 0 {
        score += DEPENDED_ON_BONUS;
        score += (PER_DEPENDENT_BONUS * dependents).min(MAX_DEPENDENT_BONUS);
    }

    if task.estimated_hours.is_some_and(|h| h <= QUICK_WIN_HOURS) {
        score += QUICK_WIN_BONUS;
    }

    if let Some(due) = task.due_date {
        score += due_bonus(due, today);
    }

    if task.status == Status::InProgress {
        score += IN_PROGRESS_BONUS;
    }

    score.clamp(0, MAX_SCORE as i32) as u8
}

/// Score all active tasks and order them by score, highest first.
///
/// The sort is stable: equal scores keep their order in the task list.
pub fn prioritize<'a>(
    tasks: &'a [Task],
    today: NaiveDate,
    config: &PlannerConfig,
) -> Vec<ScoredTask<'a>> {
    let active: Vec<&Task> = tasks.iter().filter(|t| !t.status.is_complete()).collect();
    let mut scored: Vec<ScoredTask<'a>> = active
        .iter()
        .map(|&task| ScoredTask {
            task,
            score: score(task, &active, today, config),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 12).unwrap()
    }

    fn task(id: u64, priority: Option<Priority>) -> Task {
        let mut t = Task::new(id, format!("task {id}"));
        t.priority = priority;
        t
    }

    fn alone(t: &Task) -> u8 {
        score(t, &[t], today(), &PlannerConfig::default())
    }

    #[test]
    fn high_priority_due_tomorrow_clamps_to_100() {
        let mut a = task(1, Some(Priority::High));
        a.due_date = today().succ_opt();
        assert_eq!(alone(&a), 100);
    }

    #[test]
    fn low_priority_without_extras_scores_55() {
        assert_eq!(alone(&task(2, Some(Priority::Low))), 55);
    }

    #[test]
    fn score_is_monotonic_in_priority_label() {
        let scores: Vec<u8> = Priority::ALL
            .iter()
            .map(|p| alone(&task(1, Some(*p))))
            .collect();
        assert_eq!(scores, vec![90, 80, 65, 55]);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn missing_priority_uses_configured_default() {
        let unspecified = task(1, None);
        let config = PlannerConfig {
            default_priority: Priority::Low,
            ..PlannerConfig::default()
        };
        assert_eq!(score(&unspecified, &[&unspecified], today(), &config), 55);
        assert_eq!(alone(&unspecified), alone(&task(1, Some(Priority::Medium))));
    }

    #[test]
    fn critical_default_gives_unlabelled_tasks_the_low_bonus() {
        let unspecified = task(1, None);
        let config = PlannerConfig {
            default_priority: Priority::Critical,
            ..PlannerConfig::default()
        };
        assert_eq!(score(&unspecified, &[&unspecified], today(), &config), 55);

        let config = PlannerConfig {
            default_priority: Priority::High,
            ..PlannerConfig::default()
        };
        assert_eq!(score(&unspecified, &[&unspecified], today(), &config), 80);
    }

    #[test]
    fn overdue_beats_no_due_date() {
        let plain = task(1, Some(Priority::Low));
        let mut overdue = plain.clone();
        overdue.due_date = today().pred_opt();
        assert!(alone(&overdue) > alone(&plain));
        assert_eq!(alone(&overdue), 100);
    }

    #[test]
    fn due_bonus_bands() {
        let d = |days: i64| today() + chrono::Duration::days(days);
        assert_eq!(due_bonus(d(-1), today()), 50);
        assert_eq!(due_bonus(d(0), today()), 40);
        assert_eq!(due_bonus(d(1), today()), 40);
        assert_eq!(due_bonus(d(3), today()), 30);
        assert_eq!(due_bonus(d(7), today()), 20);
        assert_eq!(due_bonus(d(8), today()), 0);
    }

    #[test]
    fn fan_out_bonus_is_capped() {
        let blocker = task(1, Some(Priority::Low));
        let mut waiting: Vec<Task> = (2..=7).map(|id| task(id, Some(Priority::Low))).collect();
        for t in &mut waiting {
            t.dependencies.push(TaskId::Num(1));
        }

        let mut active: Vec<&Task> = vec![&blocker];
        active.extend(waiting.iter().take(1));
        // 55 + 10 + 5
        assert_eq!(score(&blocker, &active, today(), &PlannerConfig::default()), 70);

        let mut active: Vec<&Task> = vec![&blocker];
        active.extend(waiting.iter());
        // 55 + 10 + min(20, 30)
        assert_eq!(score(&blocker, &active, today(), &PlannerConfig::default()), 85);
    }

    #[test]
    fn quick_wins_and_in_progress_get_a_boost() {
        let mut t = task(1, Some(Priority::Low));
        t.estimated_hours = Some(2.0);
        assert_eq!(alone(&t), 60);
        t.estimated_hours = Some(2.5);
        assert_eq!(alone(&t), 55);
        t.status = Status::InProgress;
        assert_eq!(alone(&t), 70);
    }

    #[test]
    fn prioritize_skips_completed_and_sorts_stably() {
        let mut done = task(1, Some(Priority::Critical));
        done.status = Status::Done;
        let tasks = vec![
            done,
            task(2, Some(Priority::Low)),
            task(3, Some(Priority::High)),
            task(4, Some(Priority::Low)),
        ];
        let scored = prioritize(&tasks, today(), &PlannerConfig::default());
        let order: Vec<String> = scored.iter().map(|s| s.task.id.to_string()).collect();
        assert_eq!(order, ["3", "2", "4"]);
        assert!(scored.iter().all(|s| s.score <= MAX_SCORE));
    }

    #[test]
    fn completed_dependents_do_not_count() {
        let blocker = task(1, Some(Priority::Low));
        let mut finished = task(2, Some(Priority::Low));
        finished.dependencies.push(TaskId::Num(1));
        finished.status = Status::Done;
        let tasks = vec![blocker, finished];
        let scored = prioritize(&tasks, today(), &PlannerConfig::default());
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].score, 55);
    }
}
