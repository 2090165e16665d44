// src/sync/protocol.rs

//! Boundary operations and their wire shapes.
//!
//! Field names are camelCase on the wire (`jobId`, `hasCycles`,
//! `cycleDetails`, `completedAt`, `updatedTasks`, ...).

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dag::Task;
use crate::engine::{JobId, JobManager, JobSnapshot};
use crate::errors::Result;
use crate::types::{JobStatus, TaskStatus};

/// Payload of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    pub tasks: Vec<Task>,
    pub has_cycles: bool,
    pub cycle_details: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl JobData {
    /// Present iff the job is completed.
    pub fn from_snapshot(job: &JobSnapshot) -> Option<Self> {
        if job.status != JobStatus::Completed {
            return None;
        }
        let completed_at = job.completed_at?;
        Some(Self {
            tasks: job.tasks.clone(),
            has_cycles: job.has_cycles,
            cycle_details: job.cycle_details.clone(),
            completed_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub cached: bool,
    /// Present when the job was already completed when the call returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JobData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn new(job: &JobSnapshot, cached: bool) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            cached,
            data: JobData::from_snapshot(job),
            error: job.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Present iff `status` is `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JobData>,
    /// Present iff `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&JobSnapshot> for StatusResponse {
    fn from(job: &JobSnapshot) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            data: JobData::from_snapshot(job),
            error: job.error.clone(),
        }
    }
}

impl From<SubmitResponse> for StatusResponse {
    fn from(resp: SubmitResponse) -> Self {
        Self {
            job_id: resp.job_id,
            status: resp.status,
            data: resp.data,
            error: resp.error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskResponse {
    pub updated_tasks: Vec<Task>,
}

/// One line of `list_jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobStatus,
    pub task_count: usize,
    pub completed_tasks: usize,
    pub has_cycles: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&JobSnapshot> for JobSummary {
    fn from(job: &JobSnapshot) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            task_count: job.tasks.len(),
            completed_tasks: job.count_tasks(TaskStatus::Completed),
            has_cycles: job.has_cycles,
            created_at: job.created_at,
            completed_at: job.completed_at,
        }
    }
}

/// Boxed future returned by [`JobService`] operations.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The operations a client can perform against the job engine.
///
/// Ids are plain strings at this boundary; an id that does not parse is
/// reported as `NotFound`.
pub trait JobService: Send + Sync {
    fn submit<'a>(&'a self, transcript: &'a str) -> ServiceFuture<'a, SubmitResponse>;

    fn get_status<'a>(&'a self, job_id: &'a str) -> ServiceFuture<'a, StatusResponse>;

    fn complete_task<'a>(
        &'a self,
        job_id: &'a str,
        task_id: &'a str,
    ) -> ServiceFuture<'a, CompleteTaskResponse>;

    /// No ordering guarantee across calls.
    fn list_jobs(&self) -> ServiceFuture<'_, Vec<JobSummary>>;
}

impl JobService for JobManager {
    fn submit<'a>(&'a self, transcript: &'a str) -> ServiceFuture<'a, SubmitResponse> {
        Box::pin(async move {
            let submission = JobManager::submit(self, transcript).await?;
            Ok(SubmitResponse::new(&submission.job, submission.cached))
        })
    }

    fn get_status<'a>(&'a self, job_id: &'a str) -> ServiceFuture<'a, StatusResponse> {
        Box::pin(async move {
            let id: JobId = job_id.parse()?;
            let job = self.job(&id).await?;
            Ok(StatusResponse::from(job.as_ref()))
        })
    }

    fn complete_task<'a>(
        &'a self,
        job_id: &'a str,
        task_id: &'a str,
    ) -> ServiceFuture<'a, CompleteTaskResponse> {
        Box::pin(async move {
            let id: JobId = job_id.parse()?;
            let step = JobManager::complete_task(self, &id, task_id).await?;
            Ok(CompleteTaskResponse {
                updated_tasks: step.updated_tasks,
            })
        })
    }

    fn list_jobs(&self) -> ServiceFuture<'_, Vec<JobSummary>> {
        Box::pin(async move {
            let jobs = self.jobs().await;
            Ok(jobs.iter().map(|job| JobSummary::from(job.as_ref())).collect())
        })
    }
}
