#![allow(dead_code)]

use insightboard::config::ServiceSection;
use insightboard::dag::{TaskGraph, TaskRecord};
use insightboard::types::Priority;

/// Builder for a single `TaskRecord`.
pub struct TaskRecordBuilder {
    record: TaskRecord,
}

impl TaskRecordBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            record: TaskRecord::new(id, format!("do {id}")),
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.record.description = desc.to_string();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.record.priority = priority;
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.record.dependencies.push(dep.to_string());
        self
    }

    pub fn build(self) -> TaskRecord {
        self.record
    }
}

/// Builder for an ordered list of task records.
///
/// ```ignore
/// let records = TaskListBuilder::new()
///     .task("A", &[])
///     .task("B", &["A"])
///     .build();
/// ```
#[derive(Default)]
pub struct TaskListBuilder {
    records: Vec<TaskRecord>,
}

impl TaskListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task with default description and priority.
    pub fn task(self, id: &str, deps: &[&str]) -> Self {
        let mut builder = TaskRecordBuilder::new(id);
        for dep in deps {
            builder = builder.after(dep);
        }
        self.record(builder.build())
    }

    pub fn record(mut self, record: TaskRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn build(self) -> Vec<TaskRecord> {
        self.records
    }

    pub fn graph(self) -> TaskGraph {
        TaskGraph::from_records(self.records)
    }
}

/// Service settings suitable for tests: caching on, no fast path.
pub fn service_section() -> ServiceSection {
    ServiceSection::default()
}
