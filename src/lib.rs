//! # taskplan
//!
//! A dependency-aware planner over a JSON task list.
//!
//! The library answers three questions about the list: which task to pick up
//! next ([`next`]), how the active backlog splits into time horizons
//! ([`scoring`], [`schedule`]), and how big each task is and how to break it
//! down ([`complexity`], [`expand`]). The `tp` binary wires these to a CLI.
//!
//! All reads and writes of the task list go through [`db::TaskStore`], which
//! refuses to overwrite a file that changed since it was loaded.

pub mod cli;
pub mod cmd;
pub mod complexity;
pub mod config;
pub mod db;
pub mod error;
pub mod expand;
pub mod fields;
pub mod next;
pub mod resolver;
pub mod schedule;
pub mod scoring;
pub mod task;

pub use error::{Error, Result};
