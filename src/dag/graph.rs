// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::dag::task_info::{TaskId, TaskRecord};

/// Internal node structure: stores the record plus immediate deps and dependents.
#[derive(Debug, Clone)]
struct TaskNode {
    record: TaskRecord,
    /// Direct dependencies, duplicates collapsed, first-seen order kept.
    /// May name ids that are not in the graph.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that list this one in their dependencies.
    dependents: Vec<TaskId>,
}

/// In-memory dependency graph keyed by task id.
///
/// Construction never fails. Dangling dependency references are kept as-is
/// and simply never resolve; cycles are left for [`crate::dag::cycles`] to
/// find.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: HashMap<TaskId, TaskNode>,
    /// Ids in the order the tasks were provided.
    order: Vec<TaskId>,
}

impl TaskGraph {
    /// Build a graph from task records, in the order given.
    ///
    /// If an id is repeated, the first record wins and later ones are
    /// dropped with a warning.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TaskRecord>,
    {
        let mut nodes: HashMap<TaskId, TaskNode> = HashMap::new();
        let mut order = Vec::new();

        // First pass: create nodes with their (deduplicated) dependency lists.
        for record in records {
            if nodes.contains_key(&record.id) {
                warn!(task = %record.id, "duplicate task id; keeping the first record");
                continue;
            }

            let mut seen = HashSet::new();
            let deps: Vec<TaskId> = record
                .dependencies
                .iter()
                .filter(|dep| seen.insert(dep.as_str()))
                .cloned()
                .collect();

            order.push(record.id.clone());
            nodes.insert(
                record.id.clone(),
                TaskNode {
                    record,
                    deps,
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: populate dependents from deps, in provided order so the
        // lists are deterministic.
        for id in &order {
            let deps = nodes.get(id).map(|n| n.deps.clone()).unwrap_or_default();
            for dep in deps {
                match nodes.get_mut(&dep) {
                    Some(dep_node) => dep_node.dependents.push(id.clone()),
                    None => debug!(task = %id, dep = %dep, "dangling dependency reference"),
                }
            }
        }

        Self { nodes, order }
    }

    /// Immediate dependencies of a task. Unknown ids have none.
    pub fn neighbors(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that depend on it).
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// All task ids, in the order the tasks were provided.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// The original record for a task.
    pub fn record(&self, id: &str) -> Option<&TaskRecord> {
        self.nodes.get(id).map(|n| &n.record)
    }

    /// Records in provided order.
    pub fn records(&self) -> impl Iterator<Item = &TaskRecord> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| &n.record))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
