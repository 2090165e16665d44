// src/engine/job.rs

//! Job identity and the immutable job snapshot served to readers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dag::{CycleReport, Task};
use crate::errors::{InsightError, Result};
use crate::types::{JobStatus, TaskStatus};

/// Identifier of a job (one per submitted transcript).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = InsightError;

    /// Unparseable ids cannot name an existing job, so they are `NotFound`.
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| InsightError::NotFound(format!("job '{s}'")))
    }
}

/// Point-in-time view of a job.
///
/// Snapshots are never patched in place: every change produces a new
/// snapshot which replaces the previous one as a whole, so a reader sees
/// either the state before a change or the state after it.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    /// Tasks in the order they were extracted. Empty until completed.
    pub tasks: Vec<Task>,
    pub has_cycles: bool,
    pub cycle_details: Vec<String>,
    /// Short diagnostic, only set when `status` is `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    /// A freshly submitted job.
    pub fn pending(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            tasks: Vec::new(),
            has_cycles: false,
            cycle_details: Vec::new(),
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn advance(&self, next: JobStatus) -> Result<Self> {
        if !self.status.can_transition_to(next) {
            return Err(InsightError::InvalidState(format!(
                "job {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        let mut snapshot = self.clone();
        snapshot.status = next;
        Ok(snapshot)
    }

    /// `Pending -> Processing`.
    pub fn processing(&self) -> Result<Self> {
        self.advance(JobStatus::Processing)
    }

    /// `Processing -> Completed`, carrying the initial task snapshot.
    pub fn completed(&self, tasks: Vec<Task>, cycles: &CycleReport) -> Result<Self> {
        let mut snapshot = self.advance(JobStatus::Completed)?;
        snapshot.tasks = tasks;
        snapshot.cycle_details = cycles.details();
        snapshot.has_cycles = !snapshot.cycle_details.is_empty();
        snapshot.completed_at = Some(Utc::now());
        Ok(snapshot)
    }

    /// `Processing -> Failed`.
    pub fn failed(&self, error: impl Into<String>) -> Result<Self> {
        let mut snapshot = self.advance(JobStatus::Failed)?;
        snapshot.error = Some(error.into());
        Ok(snapshot)
    }

    /// Same job with a refreshed task list. Status is untouched.
    pub fn with_tasks(&self, tasks: Vec<Task>) -> Self {
        let mut snapshot = self.clone();
        snapshot.tasks = tasks;
        snapshot
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn count_tasks(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}
