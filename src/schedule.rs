//! Schedule bucketing.
//!
//! Scored tasks are split into four horizons by score. The resulting
//! `Schedule` is a self-contained snapshot that can be written to disk and
//! printed; it never feeds back into the task list.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::fields::{Priority, Status};
use crate::scoring::ScoredTask;
use crate::task::TaskId;

/// One of the four planning horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Immediate,
    ThisWeek,
    Upcoming,
    Backlog,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Immediate,
        Horizon::ThisWeek,
        Horizon::Upcoming,
        Horizon::Backlog,
    ];

    /// Horizon for a priority score.
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => Horizon::Immediate,
            60..=79 => Horizon::ThisWeek,
            40..=59 => Horizon::Upcoming,
            _ => Horizon::Backlog,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Horizon::Immediate => "Do these ASAP",
            Horizon::ThisWeek => "Complete this week",
            Horizon::Upcoming => "Tackle when immediate tasks are done",
            Horizon::Backlog => "Consider these after higher priorities",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Horizon::Immediate => "Critical & Immediate",
            Horizon::ThisWeek => "This Week",
            Horizon::Upcoming => "Upcoming",
            Horizon::Backlog => "Backlog",
        }
    }
}

/// Display copy of a task inside a bucket, defaults already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: TaskId,
    pub title: String,
    pub priority: Priority,
    pub priority_score: u8,
    pub status: Status,
    pub estimated_hours: f64,
    pub due_date: Option<NaiveDate>,
    pub has_dependencies: bool,
    pub dependencies: Vec<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub description: String,
    pub count: usize,
    pub estimated_hours: f64,
    pub tasks: Vec<ScheduledTask>,
}

impl Bucket {
    fn new(horizon: Horizon) -> Self {
        Bucket {
            description: horizon.description().to_string(),
            count: 0,
            estimated_hours: 0.0,
            tasks: Vec::new(),
        }
    }

    fn push(&mut self, task: ScheduledTask) {
        self.count += 1;
        self.estimated_hours += task.estimated_hours;
        self.tasks.push(task);
    }
}

/// Schedule snapshot as written to the schedule file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub timestamp: DateTime<Utc>,
    pub total_tasks: usize,
    pub hours_per_day: f64,
    pub today: NaiveDate,
    pub immediate: Bucket,
    pub this_week: Bucket,
    pub upcoming: Bucket,
    pub backlog: Bucket,
}

impl Schedule {
    pub fn bucket(&self, horizon: Horizon) -> &Bucket {
        match horizon {
            Horizon::Immediate => &self.immediate,
            Horizon::ThisWeek => &self.this_week,
            Horizon::Upcoming => &self.upcoming,
            Horizon::Backlog => &self.backlog,
        }
    }

    fn bucket_mut(&mut self, horizon: Horizon) -> &mut Bucket {
        match horizon {
            Horizon::Immediate => &mut self.immediate,
            Horizon::ThisWeek => &mut self.this_week,
            Horizon::Upcoming => &mut self.upcoming,
            Horizon::Backlog => &mut self.backlog,
        }
    }

    /// Working days a bucket represents at the planned hours per day.
    pub fn working_days(&self, horizon: Horizon) -> f64 {
        self.bucket(horizon).estimated_hours / self.hours_per_day
    }
}

/// Partition scored tasks into horizons.
///
/// `scored` is expected in score-descending order (see
/// [`crate::scoring::prioritize`]); that order is kept inside each bucket.
/// Completed tasks are skipped. Missing estimates count as
/// `config.default_hours` for the totals only.
pub fn build_schedule(
    scored: &[ScoredTask<'_>],
    config: &PlannerConfig,
    today: NaiveDate,
    timestamp: DateTime<Utc>,
) -> Schedule {
    let mut schedule = Schedule {
        timestamp,
        total_tasks: 0,
        hours_per_day: config.hours_per_day,
        today,
        immediate: Bucket::new(Horizon::Immediate),
        this_week: Bucket::new(Horizon::ThisWeek),
        upcoming: Bucket::new(Horizon::Upcoming),
        backlog: Bucket::new(Horizon::Backlog),
    };

    for entry in scored.iter().filter(|s| !s.task.status.is_complete()) {
        let task = entry.task;
        let scheduled = ScheduledTask {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority.unwrap_or(config.default_priority),
            priority_score: entry.score,
            status: task.status,
            estimated_hours: task.estimated_hours.unwrap_or(config.default_hours),
            due_date: task.due_date,
            has_dependencies: !task.dependencies.is_empty(),
            dependencies: task.dependencies.clone(),
        };
        schedule.total_tasks += 1;
        schedule
            .bucket_mut(Horizon::for_score(entry.score))
            .push(scheduled);
    }
    schedule
}

/// Console badge for a due date, e.g. `[DUE TOMORROW]`.
pub fn due_badge(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        d if d < 0 => format!("[OVERDUE by {} days]", -d),
        0 => "[DUE TODAY]".to_string(),
        1 => "[DUE TOMORROW]".to_string(),
        d => format!("[Due in {d} days]"),
    }
}
