#![allow(dead_code)]

use std::collections::HashSet;
use std::error::Error;

use insightboard::dag::{detect_cycles, resolve_statuses, StatusMap, TaskGraph, TaskId};
use insightboard::types::TaskStatus;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Build the cycle report and resolve statuses for `graph` in one go.
pub fn resolve(graph: &TaskGraph, completed: &[&str]) -> StatusMap {
    let cycles = detect_cycles(graph);
    let completed: HashSet<TaskId> = completed.iter().map(|s| s.to_string()).collect();
    resolve_statuses(graph, &cycles, &completed)
}

/// Assert a batch of `(task, status)` pairs against a status map.
pub fn assert_statuses(statuses: &StatusMap, expected: &[(&str, TaskStatus)]) {
    for (id, status) in expected {
        assert_eq!(
            statuses.status_of(id),
            Some(*status),
            "unexpected status for task {id}"
        );
    }
}
