// src/dag/task_info.rs

//! Task records as produced by extraction, and tasks as served to clients.

use serde::{Deserialize, Serialize};

use crate::types::{Priority, TaskStatus};

/// Canonical task identifier type used throughout the engine.
pub type TaskId = String;

/// One unit of work as handed over by the extraction step.
///
/// `dependencies` reference other tasks by id; a reference to an id that
/// never appears in the same job is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
}

impl TaskRecord {
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            priority: Priority::default(),
            dependencies: Vec::new(),
        }
    }
}

/// A task together with its resolved status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub priority: Priority,
    pub dependencies: Vec<TaskId>,
    pub status: TaskStatus,
    /// Only set when `status` is [`TaskStatus::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Task {
    pub fn is_ready(&self) -> bool {
        self.status == TaskStatus::Ready
    }
}
