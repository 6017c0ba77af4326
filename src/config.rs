//! Configuration loading and management
//!
//! Handles parsing of `taskplan.toml` and the environment overrides inherited
//! from earlier versions of the tool. Every planner default (hours, priority,
//! subtask base count, complexity threshold, working hours per day) lives here
//! and is handed to the components explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::Priority;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "taskplan.toml";

/// Largest base subtask count; the recommendation adds at most 2, keeping
/// generated subtasks within the 50 that `expand --num` allows.
pub const MAX_DEFAULT_SUBTASKS: u32 = 48;

/// Planner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Task list location
    pub tasks_file: PathBuf,

    /// Where `schedule` writes its snapshot
    pub schedule_file: PathBuf,

    /// Where `analyze-complexity` writes its report
    pub complexity_report_file: PathBuf,

    /// Priority assumed for tasks without one
    pub default_priority: Priority,

    /// Hours assumed for tasks without an estimate when summing buckets
    pub default_hours: f64,

    /// Base subtask count used by the complexity recommendation
    pub default_subtasks: u32,

    /// Complexity at or above which a task should be expanded
    pub complexity_threshold: u8,

    /// Productive hours per working day
    pub hours_per_day: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tasks_file: PathBuf::from("tasks/tasks.json"),
            schedule_file: PathBuf::from("tasks/schedule.json"),
            complexity_report_file: PathBuf::from("scripts/task-complexity-report.json"),
            default_priority: Priority::Medium,
            default_hours: 2.0,
            default_subtasks: 3,
            complexity_threshold: 5,
            hours_per_day: 6.0,
        }
    }
}

impl PlannerConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist; otherwise `taskplan.toml` in the working
    /// directory is used when present. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Apply `DEFAULT_PRIORITY` and `DEFAULT_SUBTASKS` overrides.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("DEFAULT_PRIORITY").filter(|v| !v.trim().is_empty()) {
            self.default_priority = raw
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("DEFAULT_PRIORITY={raw}")))?;
        }
        if let Some(raw) = lookup("DEFAULT_SUBTASKS").filter(|v| !v.trim().is_empty()) {
            self.default_subtasks = raw
                .trim()
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("DEFAULT_SUBTASKS={raw}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_hours > 0.0) {
            return Err(Error::InvalidConfig(
                "default_hours must be a positive number".into(),
            ));
        }
        if !(self.hours_per_day > 0.0) {
            return Err(Error::InvalidConfig(
                "hours_per_day must be a positive number".into(),
            ));
        }
        if !(1..=MAX_DEFAULT_SUBTASKS).contains(&self.default_subtasks) {
            return Err(Error::InvalidConfig(format!(
                "default_subtasks must be between 1 and {MAX_DEFAULT_SUBTASKS}"
            )));
        }
        if !(1..=10).contains(&self.complexity_threshold) {
            return Err(Error::InvalidConfig(
                "complexity_threshold must be between 1 and 10".into(),
            ));
        }
        Ok(())
    }
}
