//! Subtask expansion.
//!
//! Generates placeholder subtasks for a task. The phases come from a category
//! picked by keywords in the task description; when more subtasks are asked
//! for than a category has phases, the phases repeat.

use chrono::{DateTime, Utc};
use serde_json::Map;

use crate::fields::Status;
use crate::task::{Subtask, Task};

/// Kind of work a task describes, used to choose subtask phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Setup,
    Interface,
    Data,
    Auth,
    Testing,
    General,
}

impl Category {
    /// Checked in order; the first match wins.
    const DETECTION: [(Category, &'static [&'static str]); 5] = [
        (Category::Setup, &["setup", "initialize", "initialise"]),
        (Category::Interface, &["ui", "component", "interface"]),
        (Category::Data, &["data", "model", "schema"]),
        (Category::Auth, &["auth", "login"]),
        (Category::Testing, &["test"]),
    ];

    /// Pick a category from free text. Keywords match word prefixes, so
    /// "components" matches "component" but "build" does not match "ui".
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        Self::DETECTION
            .iter()
            .find(|(_, keywords)| {
                words
                    .iter()
                    .any(|w| keywords.iter().any(|k| w.starts_with(k)))
            })
            .map(|(category, _)| *category)
            .unwrap_or(Category::General)
    }

    /// Phase name and description for each step of this kind of work.
    pub fn phases(self) -> [(&'static str, &'static str); 5] {
        match self {
            Category::Setup => [
                ("Research", "Research and gather requirements"),
                ("Design", "Design the architecture and structure"),
                ("Implementation", "Implement the core functionality"),
                ("Configuration", "Configure the system"),
                ("Documentation", "Document the setup process"),
            ],
            Category::Interface => [
                ("Design", "Design the UI component"),
                ("Structure", "Create the component structure"),
                ("Styling", "Style the component"),
                ("Interaction", "Add user interactions"),
                ("Testing", "Test the component"),
            ],
            Category::Data => [
                ("Schema", "Define the data schema"),
                ("Model", "Create the data model"),
                ("API", "Implement API endpoints"),
                ("Integration", "Integrate with the database"),
                ("Testing", "Test data operations"),
            ],
            Category::Auth => [
                ("Provider", "Set up authentication provider"),
                ("Routes", "Create authentication routes"),
                ("UI", "Implement authentication UI"),
                ("Logic", "Implement authentication logic"),
                ("Testing", "Test authentication flow"),
            ],
            Category::Testing => [
                ("Plan", "Create test plan"),
                ("Unit", "Implement unit tests"),
                ("Integration", "Implement integration tests"),
                ("E2E", "Implement end-to-end tests"),
                ("Documentation", "Document test results"),
            ],
            Category::General => [
                ("Research", "Research and gather requirements"),
                ("Design", "Design the solution"),
                ("Implementation", "Implement the solution"),
                ("Testing", "Test the implementation"),
                ("Documentation", "Document the implementation"),
            ],
        }
    }
}

/// Build `count` pending subtasks for `task`, numbered `<id>.1`, `<id>.2`, ...
pub fn generate_subtasks(task: &Task, count: u32, now: DateTime<Utc>) -> Vec<Subtask> {
    let phases = Category::detect(&task.description).phases();
    (0..count as usize)
        .map(|i| {
            let (phase, what) = phases[i % phases.len()];
            Subtask {
                id: format!("{}.{}", task.id, i + 1),
                title: format!("{} {}", phase, task.title),
                description: format!("{} for {}", what, task.title.to_lowercase()),
                status: Status::Pending,
                done: None,
                created_at: Some(now),
                extra: Map::new(),
            }
        })
        .collect()
}
