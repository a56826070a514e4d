//! Task dependency checks over the task set loaded at call time.
//!
//! An edge `A -> B` means "A depends on B". Ids that resolve to no task are
//! dangling references: they never close a cycle and never block completion.

use std::collections::{HashMap, HashSet};

use crate::error::DependencyError;
use crate::models::{Task, TaskStatus};

fn index(tasks: &[Task]) -> HashMap<&str, &Task> {
    tasks.iter().map(|t| (t.id.as_str(), t)).collect()
}

// depth-first search from `from` along existing edges, looking for `target`
fn reaches<'a>(from: &'a str, target: &str, index: &HashMap<&'a str, &'a Task>) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![from];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(&task) = index.get(current) {
            stack.extend(task.dependencies.iter().map(String::as_str));
        }
    }
    false
}

/// Reject `proposed` dependencies of `task_id` that would close a cycle.
///
/// Each candidate gets its own traversal with a fresh visited set, so
/// existing cycles elsewhere in the graph still terminate.
pub fn would_create_cycle(
    task_id: &str,
    proposed: &[String],
    tasks: &[Task],
) -> Result<(), DependencyError> {
    let index = index(tasks);
    for candidate in proposed {
        if reaches(candidate, task_id, &index) {
            let dependency = index
                .get(candidate.as_str())
                .map(|t| t.title.clone())
                .unwrap_or_else(|| candidate.clone());
            return Err(DependencyError::Cycle { dependency });
        }
    }
    Ok(())
}

/// Titles of dependencies of `task` that exist and are not completed.
pub fn unmet_dependencies(task: &Task, tasks: &[Task]) -> Vec<String> {
    let index = index(tasks);
    task.dependencies
        .iter()
        .filter_map(|id| index.get(id.as_str()))
        .filter(|dep| dep.status != TaskStatus::Completed)
        .map(|dep| dep.title.clone())
        .collect()
}

pub fn can_complete(task: &Task, tasks: &[Task]) -> bool {
    unmet_dependencies(task, tasks).is_empty()
}

/// Completion gate as an error naming the blocking tasks.
pub fn check_completion(task: &Task, tasks: &[Task]) -> Result<(), DependencyError> {
    let titles = unmet_dependencies(task, tasks);
    if titles.is_empty() {
        Ok(())
    } else {
        Err(DependencyError::Incomplete { titles })
    }
}
