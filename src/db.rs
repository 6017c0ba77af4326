//! Task store and utility functions for task planning.
//!
//! This module provides the `TaskStore` that loads and saves the JSON task list,
//! the `Snapshot` handed to every command, along with input validation and the
//! small formatting helpers shared by the console views.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::fields::*;
use crate::task::{Task, TaskId};

/// Content digest of the task list as it was when loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// The file did not exist.
    Absent,
    /// Hex SHA-256 of the file bytes.
    Digest(String),
}

impl Revision {
    fn of(bytes: &[u8]) -> Self {
        Revision::Digest(hex::encode(Sha256::digest(bytes)))
    }
}

/// In-memory copy of the task list plus the revision it was read at.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    revision: Revision,
}

impl Snapshot {
    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    /// Generate the next available numeric task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks
            .iter()
            .filter_map(|t| match &t.id {
                TaskId::Num(n) => Some(*n),
                TaskId::Text(s) => s.parse().ok(),
            })
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Get a task by ID.
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Get a task by ID, or `NotFound`.
    pub fn require(&self, id: &TaskId) -> Result<&Task> {
        self.get(id).ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// Get a mutable reference to a task by ID, or `NotFound`.
    pub fn require_mut(&mut self, id: &TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }
}

/// File-backed task list.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TaskStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the task list. A missing file is an empty list.
    pub fn load(&self) -> Result<Snapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task list absent, starting empty");
                return Ok(Snapshot {
                    tasks: Vec::new(),
                    revision: Revision::Absent,
                });
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to read task list");
                return Err(Error::store(&self.path, e));
            }
        };
        let tasks: Vec<Task> = serde_json::from_slice(&bytes).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "task list is not valid JSON");
            Error::Json(e)
        })?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded task list");
        Ok(Snapshot {
            tasks,
            revision: Revision::of(&bytes),
        })
    }

    /// Save the snapshot if the file still holds the revision it was loaded at.
    pub fn save(&self, snapshot: &mut Snapshot) -> Result<()> {
        let current = self.current_revision()?;
        if current != snapshot.revision {
            warn!(path = %self.path.display(), "task list changed since load, refusing to overwrite");
            return Err(Error::Conflict(self.path.clone()));
        }
        let mut data = serde_json::to_vec_pretty(&snapshot.tasks)?;
        data.push(b'\n');
        write_atomic(&self.path, &data)?;
        snapshot.revision = Revision::of(&data);
        debug!(path = %self.path.display(), count = snapshot.tasks.len(), "saved task list");
        Ok(())
    }

    /// Create an empty task list if none exists. Returns whether it was created.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        let mut snapshot = Snapshot {
            tasks: Vec::new(),
            revision: Revision::Absent,
        };
        self.save(&mut snapshot)?;
        Ok(true)
    }

    fn current_revision(&self) -> Result<Revision> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Revision::of(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Revision::Absent),
            Err(e) => Err(Error::store(&self.path, e)),
        }
    }
}

/// Write a value as pretty JSON through a temp file and rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    write_atomic(path, &data)
}

/// Atomic write via temp file in the target directory + rename.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io = |e: std::io::Error| {
        error!(path = %path.display(), error = %e, "write failed");
        Error::store(path, e)
    };
    fs::create_dir_all(&dir).map_err(io)?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(io)?;
    tmp.write_all(data).map_err(io)?;
    tmp.flush().map_err(io)?;
    tmp.persist(path).map_err(|e| io(e.error))?;
    Ok(())
}

/// Validate an hours estimate: a positive finite number.
pub fn parse_hours_input(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(h) if h.is_finite() && h > 0.0 => Ok(h),
        _ => Err(Error::Validation(format!(
            "Invalid hours '{s}'. Hours must be a positive number."
        ))),
    }
}

/// Validate a due date in strict `YYYY-MM-DD` form.
pub fn parse_due_input(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let shaped = s.len() == 10
        && s.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    let invalid = || Error::Validation(format!("Invalid date '{s}'. Use YYYY-MM-DD."));
    if !shaped {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())
}

/// Compact relative due date for table cells ("today", "in 3d", "2d late").
/// The schedule view uses the longer [`crate::schedule::due_badge`].
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(due) = due else {
        return "-".into();
    };
    match (due - today).num_days() {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d < 0 => format!("{}d late", -d),
        d => format!("in {d}d"),
    }
}

/// Format a priority for display, marking defaulted values.
pub fn format_priority(p: Option<Priority>, default: Priority) -> String {
    match p {
        Some(p) => p.to_string(),
        None => format!("{default}*"),
    }
}

/// Format an hours estimate without a trailing `.0`.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{hours:.1}")
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate, default_priority: Priority) {
    println!(
        "{:<7} {:<12} {:<10} {:<10} {:<10} {}",
        "ID", "Status", "Priority", "Due", "Deps", "Title"
    );
    for t in tasks {
        let deps = if t.dependencies.is_empty() {
            "-".to_string()
        } else {
            t.dependencies
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        println!(
            "{:<7} {:<12} {:<10} {:<10} {:<10} {}",
            truncate(&t.id.to_string(), 7),
            t.status,
            format_priority(t.priority, default_priority),
            format_due_relative(t.due_date, today),
            truncate(&deps, 10),
            t.title
        );
    }
}

/// Cut `s` to `width` characters, ending in an ellipsis when shortened.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
