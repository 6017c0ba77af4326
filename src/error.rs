//! Error types for taskplan
//!
//! Exit codes:
//! - 0: Success (including informational "nothing to do" outcomes)
//! - 2: User error (unknown task, invalid input, bad configuration)
//! - 3: Refused (store changed underneath us, dependency cycle)
//! - 4: Operation failed (I/O, serialization)

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskId;

/// Exit codes for the tp CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REFUSED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskplan operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Task with ID {0} not found")]
    NotFound(TaskId),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Refusals (exit code 3)
    #[error("{0} was modified by another process since it was loaded; re-run the command")]
    Conflict(PathBuf),

    #[error("Dependency cycle detected: {}", format_cycle(.0))]
    CyclicDependency(Vec<TaskId>),

    // Operation failures (exit code 4)
    #[error("IO error on {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_) | Error::Validation(_) | Error::InvalidConfig(_) => {
                exit_codes::USER_ERROR
            }

            Error::Conflict(_) | Error::CyclicDependency(_) => exit_codes::REFUSED,

            Error::Store { .. } | Error::Io(_) | Error::Json(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    pub(crate) fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Store {
            path: path.into(),
            source,
        }
    }
}

fn format_cycle(ids: &[TaskId]) -> String {
    let mut parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    if let Some(first) = ids.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}

/// Result type alias for taskplan operations
pub type Result<T> = std::result::Result<T, Error>;
