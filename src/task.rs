//! Task data structures.
//!
//! This module defines the `Task` record as it is stored in the task list, its
//! lightweight `Subtask` children, and the `TaskId` identifier shared by both.
//! Fields the planner does not understand are carried through untouched so a
//! load/save cycle never drops data written by other tools.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::{Priority, Status};

/// Opaque task identifier: numeric for top-level tasks, dotted text for subtasks.
///
/// Two ids are equal when they print the same, so `3` and `"3"` name the same
/// task. Ordering is numeric when both sides are integers and lexical otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Num(u64),
    Text(String),
}

impl TaskId {
    fn as_number(&self) -> Option<u64> {
        match self {
            TaskId::Num(n) => Some(*n),
            TaskId::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Num(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => TaskId::Num(n),
            _ => TaskId::Text(s.to_string()),
        })
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Num(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TaskId::Num(a), TaskId::Num(b)) => a == b,
            (TaskId::Text(a), TaskId::Text(b)) => a == b,
            (TaskId::Num(n), TaskId::Text(s)) | (TaskId::Text(s), TaskId::Num(n)) => {
                *s == n.to_string()
            }
        }
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        let textual = || self.to_string().cmp(&other.to_string());
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(textual),
            _ => textual(),
        }
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A work item as persisted in the task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_strategy: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Create a pending task with no optional metadata.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            details: None,
            test_strategy: None,
            status: Status::Pending,
            priority: None,
            dependencies: Vec::new(),
            estimated_hours: None,
            due_date: None,
            subtasks: Vec::new(),
            created_at: None,
            completed_at: None,
            extra: Map::new(),
        }
    }

    pub fn depends_on(&self, id: &TaskId) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

/// A lightweight child of a task, identified as `<parentId>.<ordinal>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subtask {
    pub fn is_complete(&self) -> bool {
        self.done.unwrap_or(false) || self.status.is_complete()
    }
}
