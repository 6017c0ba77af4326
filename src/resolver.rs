//! Dependency resolution.
//!
//! A task is *ready* when it is pending and every id it depends on names a task
//! that is done or completed. References to ids that are not in the list are
//! unsatisfied, never fatal.

use std::collections::HashMap;

use tracing::debug;

use crate::fields::Status;
use crate::task::{Task, TaskId};

/// Index of tasks by id, first occurrence wins.
pub fn index(tasks: &[Task]) -> HashMap<&TaskId, &Task> {
    let mut map = HashMap::with_capacity(tasks.len());
    for t in tasks {
        map.entry(&t.id).or_insert(t);
    }
    map
}

/// Whether every dependency of `task` resolves to a completed task.
pub fn dependencies_met(task: &Task, index: &HashMap<&TaskId, &Task>) -> bool {
    task.dependencies.iter().all(|dep| match index.get(dep) {
        Some(t) => t.status.is_complete(),
        None => {
            debug!(task = %task.id, dependency = %dep, "dependency does not resolve");
            false
        }
    })
}

/// Pending tasks whose dependencies are all complete, in list order.
pub fn ready_set(tasks: &[Task]) -> Vec<&Task> {
    let index = index(tasks);
    tasks
        .iter()
        .filter(|t| t.status == Status::Pending && dependencies_met(t, &index))
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Visited,
}

/// Find a dependency cycle among tasks that are not yet complete.
///
/// Returns the ids on the cycle in dependency order, without repeating the
/// first id at the end. Completed tasks and dangling references cannot block
/// anything, so edges into them are ignored.
pub fn find_cycle(tasks: &[Task]) -> Option<Vec<TaskId>> {
    let index = index(tasks);
    let mut marks: HashMap<&TaskId, Mark> = HashMap::new();
    let mut path: Vec<&TaskId> = Vec::new();

    for t in tasks.iter().filter(|t| !t.status.is_complete()) {
        if marks.contains_key(&t.id) {
            continue;
        }
        if let Some(cycle) = visit(&t.id, &index, &mut marks, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    id: &'a TaskId,
    index: &HashMap<&'a TaskId, &'a Task>,
    marks: &mut HashMap<&'a TaskId, Mark>,
    path: &mut Vec<&'a TaskId>,
) -> Option<Vec<TaskId>> {
    marks.insert(id, Mark::Visiting);
    path.push(id);

    if let Some(task) = index.get(id) {
        for dep in &task.dependencies {
            let Some((&dep_id, dep_task)) = index.get_key_value(dep) else {
                continue;
            };
            if dep_task.status.is_complete() {
                continue;
            }
            match marks.get(dep_id) {
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|p| *p == dep_id).unwrap_or(0);
                    return Some(path[start..].iter().map(|p| (*p).clone()).collect());
                }
                Some(Mark::Visited) => {}
                None => {
                    if let Some(cycle) = visit(dep_id, index, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }
    }

    path.pop();
    marks.insert(id, Mark::Visited);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, status: Status, deps: &[u64]) -> Task {
        let mut t = Task::new(id, format!("task {id}"));
        t.status = status;
        t.dependencies = deps.iter().map(|d| TaskId::Num(*d)).collect();
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn pending_tasks_without_dependencies_are_ready() {
        let tasks = vec![
            task(1, Status::Pending, &[]),
            task(2, Status::InProgress, &[]),
            task(3, Status::Deferred, &[]),
            task(4, Status::Pending, &[]),
        ];
        assert_eq!(ids(&ready_set(&tasks)), ["1", "4"]);
    }

    #[test]
    fn undone_dependency_blocks_dependent() {
        let tasks = vec![task(3, Status::Pending, &[4]), task(4, Status::Pending, &[])];
        assert_eq!(ids(&ready_set(&tasks)), ["4"]);
    }

    #[test]
    fn done_and_completed_dependencies_both_satisfy() {
        let tasks = vec![
            task(1, Status::Done, &[]),
            task(2, Status::Completed, &[]),
            task(3, Status::Pending, &[1, 2]),
        ];
        assert_eq!(ids(&ready_set(&tasks)), ["3"]);
    }

    #[test]
    fn missing_dependency_is_unsatisfied() {
        let tasks = vec![task(1, Status::Pending, &[42])];
        assert!(ready_set(&tasks).is_empty());
    }

    #[test]
    fn textual_dependency_matches_numeric_id() {
        let mut dependent = task(2, Status::Pending, &[]);
        dependent.dependencies = vec![TaskId::Text("1".into())];
        let tasks = vec![task(1, Status::Done, &[]), dependent];
        assert_eq!(ids(&ready_set(&tasks)), ["2"]);
    }

    #[test]
    fn detects_two_task_cycle() {
        let tasks = vec![task(1, Status::Pending, &[2]), task(2, Status::Pending, &[1])];
        assert!(ready_set(&tasks).is_empty());
        let cycle = find_cycle(&tasks).unwrap();
        assert_eq!(cycle, vec![TaskId::Num(1), TaskId::Num(2)]);
    }

    #[test]
    fn reports_only_the_looping_part() {
        let tasks = vec![
            task(1, Status::Pending, &[2]),
            task(2, Status::Pending, &[3]),
            task(3, Status::Pending, &[4]),
            task(4, Status::Pending, &[2]),
        ];
        let cycle = find_cycle(&tasks).unwrap();
        assert_eq!(cycle, vec![TaskId::Num(2), TaskId::Num(3), TaskId::Num(4)]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let tasks = vec![task(7, Status::Pending, &[7])];
        assert_eq!(find_cycle(&tasks), Some(vec![TaskId::Num(7)]));
    }

    #[test]
    fn completed_tasks_break_cycles() {
        let tasks = vec![task(1, Status::Done, &[2]), task(2, Status::Pending, &[1])];
        assert_eq!(find_cycle(&tasks), None);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let tasks = vec![
            task(1, Status::Pending, &[2, 3]),
            task(2, Status::Pending, &[4]),
            task(3, Status::Pending, &[4]),
            task(4, Status::Pending, &[]),
        ];
        assert_eq!(find_cycle(&tasks), None);
        assert_eq!(ids(&ready_set(&tasks)), ["4"]);
    }
}
