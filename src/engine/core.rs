// src/engine/core.rs

//! Pure per-job state machine.
//!
//! `JobCore` owns a completed job's graph, its cycle report and the set of
//! completed task ids. It performs no IO and holds no locks; the async shell
//! (`engine::runtime::JobManager`) serialises access to it and publishes the
//! tasks it produces.
//!
//! The graph and cycle report never change after construction. Completing a
//! task only grows the completed set and re-runs the resolver.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::dag::{
    detect_cycles, resolve_statuses, tasks_with_status, CycleReport, StatusMap, Task, TaskGraph,
    TaskId, TaskRecord,
};
use crate::errors::{InsightError, Result};
use crate::types::TaskStatus;

/// Structured result of a single completion.
#[derive(Debug, Clone)]
pub struct CompletionStep {
    /// Every task of the job, with refreshed statuses, in extraction order.
    pub updated_tasks: Vec<Task>,
    /// Tasks that moved from `Blocked` to `Ready` because of this completion.
    pub newly_ready: Vec<TaskId>,
}

#[derive(Debug)]
pub struct JobCore {
    graph: TaskGraph,
    cycles: CycleReport,
    completed: HashSet<TaskId>,
    statuses: StatusMap,
}

impl JobCore {
    /// Build the graph, detect cycles and run the initial resolution.
    pub fn from_records(records: Vec<TaskRecord>) -> Self {
        let graph = TaskGraph::from_records(records);
        let cycles = detect_cycles(&graph);
        let completed = HashSet::new();
        let statuses = resolve_statuses(&graph, &cycles, &completed);

        debug!(
            tasks = graph.len(),
            cycles = cycles.cycles().len(),
            ready = statuses.count(TaskStatus::Ready),
            "initial resolution done"
        );

        Self {
            graph,
            cycles,
            completed,
            statuses,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn cycles(&self) -> &CycleReport {
        &self.cycles
    }

    pub fn status_of(&self, task: &str) -> Option<TaskStatus> {
        self.statuses.status_of(task)
    }

    /// Current tasks with their statuses.
    pub fn tasks(&self) -> Vec<Task> {
        tasks_with_status(&self.graph, &self.statuses)
    }

    /// Mark a ready task as completed and re-resolve the whole graph.
    ///
    /// Fails with `NotFound` for an unknown task and with `InvalidState` for
    /// a task that is not `Ready`; in both cases nothing changes.
    pub fn complete(&mut self, task: &str) -> Result<CompletionStep> {
        let current = self
            .statuses
            .status_of(task)
            .ok_or_else(|| InsightError::NotFound(format!("task '{task}'")))?;

        if current != TaskStatus::Ready {
            return Err(InsightError::InvalidState(format!(
                "task '{task}' is {current}; only ready tasks can be completed"
            )));
        }

        let mut completed = self.completed.clone();
        completed.insert(task.to_string());
        let statuses = resolve_statuses(&self.graph, &self.cycles, &completed);

        // Only direct dependents can change: everything else sees the same
        // dependency statuses as before.
        let newly_ready: Vec<TaskId> = self
            .graph
            .dependents_of(task)
            .iter()
            .filter(|id| {
                self.statuses.status_of(id) == Some(TaskStatus::Blocked)
                    && statuses.status_of(id) == Some(TaskStatus::Ready)
            })
            .cloned()
            .collect();

        self.completed = completed;
        self.statuses = statuses;

        info!(task = %task, ?newly_ready, "task completed");

        Ok(CompletionStep {
            updated_tasks: self.tasks(),
            newly_ready,
        })
    }
}
