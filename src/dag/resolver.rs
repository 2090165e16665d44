// src/dag/resolver.rs

//! Status resolution.
//!
//! Rules, in precedence order:
//! 1. a task on a reported cycle is `Error`, with a message naming the cycle;
//! 2. a task in the completed set is `Completed`;
//! 3. a task with no dependencies, or only `Completed` dependencies, is `Ready`;
//! 4. anything else is `Blocked` (this includes dangling references and
//!    dependents of `Error` tasks).
//!
//! Cycle members are resolved first. The remaining tasks form an acyclic
//! subgraph and are resolved in topological order, so every dependency's
//! status is known before its dependents are looked at.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{trace, warn};

use crate::dag::cycles::CycleReport;
use crate::dag::graph::TaskGraph;
use crate::dag::task_info::{Task, TaskId};
use crate::types::TaskStatus;

/// Resolved status of a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: TaskStatus,
    pub error_message: Option<String>,
}

impl Resolution {
    fn plain(status: TaskStatus) -> Self {
        Self {
            status,
            error_message: None,
        }
    }
}

/// Status of every task in a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMap {
    entries: HashMap<TaskId, Resolution>,
}

impl StatusMap {
    pub fn get(&self, id: &str) -> Option<&Resolution> {
        self.entries.get(id)
    }

    pub fn status_of(&self, id: &str) -> Option<TaskStatus> {
        self.entries.get(id).map(|r| r.status)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tasks currently in `status`.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.entries.values().filter(|r| r.status == status).count()
    }
}

/// Compute a status for every task in `graph`.
///
/// Pure function of its inputs: the same graph, cycles and completed set
/// always give the same map.
pub fn resolve_statuses(
    graph: &TaskGraph,
    cycles: &CycleReport,
    completed: &HashSet<TaskId>,
) -> StatusMap {
    let mut entries: HashMap<TaskId, Resolution> = HashMap::with_capacity(graph.len());

    for id in graph.all_ids() {
        if let Some(cycle) = cycles.cycle_of(id) {
            entries.insert(
                id.to_string(),
                Resolution {
                    status: TaskStatus::Error,
                    error_message: Some(format!("circular dependency: {}", cycle.describe())),
                },
            );
        }
    }

    for id in acyclic_order(graph, cycles) {
        let status = if completed.contains(id) {
            TaskStatus::Completed
        } else {
            let deps_done = graph.neighbors(id).iter().all(|dep| {
                entries
                    .get(dep)
                    .is_some_and(|r| r.status == TaskStatus::Completed)
            });
            if deps_done {
                TaskStatus::Ready
            } else {
                TaskStatus::Blocked
            }
        };

        trace!(task = %id, %status, "resolved task status");
        entries.insert(id.to_string(), Resolution::plain(status));
    }

    StatusMap { entries }
}

/// Topological order (dependencies first) of the tasks that are not on a
/// reported cycle.
fn acyclic_order<'g>(graph: &'g TaskGraph, cycles: &CycleReport) -> Vec<&'g str> {
    // Edge direction: dep -> task, so a topological sort lists deps first.
    let mut dag: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in graph.all_ids().filter(|id| !cycles.is_member(id)) {
        dag.add_node(id);
    }

    for id in graph.all_ids().filter(|id| !cycles.is_member(id)) {
        for dep in graph.neighbors(id) {
            if dag.contains_node(dep.as_str()) {
                dag.add_edge(dep.as_str(), id, ());
            }
        }
    }

    match toposort(&dag, None) {
        Ok(order) => order,
        Err(cycle) => {
            // Every node of a cyclic component is a member, so this should
            // not happen. Falling back to provided order leaves anything
            // unresolved as Blocked, never Ready.
            warn!(
                task = %cycle.node_id(),
                "unexpected cycle outside the reported set; resolving in provided order"
            );
            graph
                .all_ids()
                .filter(|id| !cycles.is_member(id))
                .collect()
        }
    }
}

/// Combine the graph's records with resolved statuses, in provided order.
pub fn tasks_with_status(graph: &TaskGraph, statuses: &StatusMap) -> Vec<Task> {
    graph
        .records()
        .map(|record| {
            let resolution = statuses
                .get(&record.id)
                .cloned()
                .unwrap_or(Resolution::plain(TaskStatus::Blocked));
            Task {
                id: record.id.clone(),
                description: record.description.clone(),
                priority: record.priority,
                dependencies: graph.neighbors(&record.id).to_vec(),
                status: resolution.status,
                error_message: resolution.error_message,
            }
        })
        .collect()
}
