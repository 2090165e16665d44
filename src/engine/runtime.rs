// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, RwLock, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::ServiceSection;
use crate::dag::TaskRecord;
use crate::engine::cache::{cache_key, normalize_transcript, validate_transcript, TranscriptCache};
use crate::engine::core::{CompletionStep, JobCore};
use crate::engine::job::{JobId, JobSnapshot};
use crate::errors::{InsightError, Result};
use crate::extract::{check_extracted, ExtractorBackend};
use crate::types::JobStatus;

/// Result of [`JobManager::submit`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub job: Arc<JobSnapshot>,
    /// `true` when an existing job for the same content was returned.
    pub cached: bool,
}

/// One job's shared state.
///
/// - `snapshot` is what readers see; it is only ever replaced whole.
/// - `core` is the single-writer section: lifecycle transitions and every
///   completion take this lock, so resolution passes never interleave.
struct JobEntry {
    id: JobId,
    cache_key: String,
    snapshot: RwLock<Arc<JobSnapshot>>,
    core: Mutex<Option<JobCore>>,
    status_tx: watch::Sender<JobStatus>,
}

impl JobEntry {
    fn new(id: JobId, cache_key: String) -> Self {
        let (status_tx, _) = watch::channel(JobStatus::Pending);
        Self {
            id,
            cache_key,
            snapshot: RwLock::new(Arc::new(JobSnapshot::pending(id))),
            core: Mutex::new(None),
            status_tx,
        }
    }

    async fn snapshot(&self) -> Arc<JobSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Swap in a new snapshot and notify status watchers.
    async fn publish(&self, next: JobSnapshot) {
        let status = next.status;
        *self.snapshot.write().await = Arc::new(next);
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    async fn begin_processing(&self) -> Result<()> {
        let _core = self.core.lock().await;
        let next = self.snapshot().await.processing()?;
        self.publish(next).await;
        info!(job_id = %self.id, "job processing");
        Ok(())
    }

    async fn finish(&self, records: Vec<TaskRecord>) -> Result<()> {
        let mut core = self.core.lock().await;
        let job_core = JobCore::from_records(records);
        let next = self
            .snapshot()
            .await
            .completed(job_core.tasks(), job_core.cycles())?;

        info!(
            job_id = %self.id,
            tasks = next.tasks.len(),
            has_cycles = next.has_cycles,
            "job completed"
        );

        *core = Some(job_core);
        self.publish(next).await;
        Ok(())
    }

    async fn fail(&self, diagnostic: String) -> Result<()> {
        let _core = self.core.lock().await;
        let next = self.snapshot().await.failed(diagnostic)?;
        warn!(job_id = %self.id, error = ?next.error, "job failed");
        self.publish(next).await;
        Ok(())
    }
}

struct Registry {
    jobs: HashMap<JobId, Arc<JobEntry>>,
    cache: TranscriptCache,
}

struct Inner {
    extractor: Arc<dyn ExtractorBackend>,
    service: ServiceSection,
    registry: RwLock<Registry>,
    permits: Semaphore,
}

/// Owns every job and drives each one through
/// `pending -> processing -> completed | failed`.
///
/// Cheap to clone; clones share the same jobs. Jobs never share mutable
/// state with each other: each has its own graph, snapshot and writer lock.
#[derive(Clone)]
pub struct JobManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for JobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobManager")
            .field("service", &self.inner.service)
            .finish_non_exhaustive()
    }
}

impl JobManager {
    pub fn new(extractor: Arc<dyn ExtractorBackend>, service: ServiceSection) -> Self {
        let permits = Semaphore::new(service.max_concurrent_jobs.max(1));
        Self {
            inner: Arc::new(Inner {
                extractor,
                service,
                registry: RwLock::new(Registry {
                    jobs: HashMap::new(),
                    cache: TranscriptCache::new(),
                }),
                permits,
            }),
        }
    }

    /// Accept a transcript and start (or reuse) a job for it.
    ///
    /// - Empty transcripts are rejected with `Validation`; no job is created.
    /// - With the cache enabled, content that normalises to an existing
    ///   non-failed job returns that job with `cached = true`.
    /// - Otherwise a new `pending` job is registered and its pipeline is
    ///   spawned. If `fast_path_ms > 0`, this waits up to that long for the
    ///   job to reach a terminal status before answering.
    pub async fn submit(&self, transcript: &str) -> Result<Submission> {
        validate_transcript(transcript)?;

        let service = &self.inner.service;
        let key = cache_key(&normalize_transcript(transcript, service.collapse_whitespace));

        let entry = {
            let mut registry = self.inner.registry.write().await;

            if service.cache_enabled {
                let existing = registry
                    .cache
                    .lookup(&key)
                    .and_then(|id| registry.jobs.get(&id).cloned());

                if let Some(existing) = existing {
                    let snapshot = existing.snapshot().await;
                    if snapshot.status != JobStatus::Failed {
                        info!(
                            job_id = %snapshot.id,
                            status = %snapshot.status,
                            "cache hit for transcript"
                        );
                        return Ok(Submission {
                            job: snapshot,
                            cached: true,
                        });
                    }
                    debug!(job_id = %snapshot.id, "cached job failed; starting a new one");
                }
            }

            let id = JobId::new();
            let entry = Arc::new(JobEntry::new(id, key.clone()));
            registry.jobs.insert(id, Arc::clone(&entry));
            if service.cache_enabled {
                registry.cache.insert(key, id);
            }
            entry
        };

        info!(job_id = %entry.id, "job submitted");

        let mut status_rx = entry.status_tx.subscribe();
        tokio::spawn(run_pipeline(
            Arc::clone(&self.inner),
            Arc::clone(&entry),
            transcript.to_string(),
        ));

        let fast_path = service.fast_path();
        if !fast_path.is_zero() {
            let finished = tokio::time::timeout(fast_path, async {
                status_rx.wait_for(|s| s.is_terminal()).await.is_ok()
            })
            .await
            .unwrap_or(false);
            debug!(job_id = %entry.id, finished, "fast path wait over");
        }

        Ok(Submission {
            job: entry.snapshot().await,
            cached: false,
        })
    }

    /// Current snapshot of a job.
    pub async fn job(&self, job_id: &JobId) -> Result<Arc<JobSnapshot>> {
        Ok(self.entry(job_id).await?.snapshot().await)
    }

    /// Snapshots of every job, oldest first.
    pub async fn jobs(&self) -> Vec<Arc<JobSnapshot>> {
        let entries: Vec<Arc<JobEntry>> = {
            let registry = self.inner.registry.read().await;
            registry.jobs.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(entries.len());
        for entry in entries {
            snapshots.push(entry.snapshot().await);
        }
        snapshots.sort_by_key(|s| s.created_at);
        snapshots
    }

    /// Mark a ready task of a completed job as completed.
    ///
    /// Completions against the same job are serialised; readers keep seeing
    /// the previous snapshot until the new one is swapped in.
    pub async fn complete_task(&self, job_id: &JobId, task_id: &str) -> Result<CompletionStep> {
        let entry = self.entry(job_id).await?;
        let mut guard = entry.core.lock().await;
        let snapshot = entry.snapshot().await;

        let core = match guard.as_mut() {
            Some(core) if snapshot.status == JobStatus::Completed => core,
            _ => {
                return Err(InsightError::InvalidState(format!(
                    "job {job_id} is {}; tasks can only be completed on a completed job",
                    snapshot.status
                )));
            }
        };

        let step = core.complete(task_id)?;
        entry
            .publish(snapshot.with_tasks(step.updated_tasks.clone()))
            .await;
        Ok(step)
    }

    /// Wait until a job is terminal, or until `limit` elapses.
    ///
    /// Returns the latest snapshot either way.
    pub async fn wait_until_terminal(
        &self,
        job_id: &JobId,
        limit: Duration,
    ) -> Result<Arc<JobSnapshot>> {
        let entry = self.entry(job_id).await?;
        let mut status_rx = entry.status_tx.subscribe();
        let _ = tokio::time::timeout(limit, async {
            status_rx.wait_for(|s| s.is_terminal()).await.is_ok()
        })
        .await;
        Ok(entry.snapshot().await)
    }

    async fn entry(&self, job_id: &JobId) -> Result<Arc<JobEntry>> {
        let registry = self.inner.registry.read().await;
        registry
            .jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| InsightError::NotFound(format!("job '{job_id}'")))
    }
}

/// One job's unit of work: extraction, graph build, cycle detection and the
/// initial resolution.
///
/// The job is `processing` from the moment its pipeline starts; the permit
/// only bounds how many extractions run at once.
async fn run_pipeline(inner: Arc<Inner>, entry: Arc<JobEntry>, transcript: String) {
    if let Err(err) = entry.begin_processing().await {
        error!(job_id = %entry.id, error = %err, "could not start job");
        return;
    }

    let permit = inner.permits.acquire().await.ok();
    debug!(job_id = %entry.id, "extraction permit acquired");

    let result = if permit.is_some() {
        extract_records(Arc::clone(&inner.extractor), transcript).await
    } else {
        Err(InsightError::Extraction(
            "job engine is shutting down".to_string(),
        ))
    };
    drop(permit);

    let outcome = match result {
        Ok(records) => entry.finish(records).await,
        Err(err) => {
            let outcome = entry.fail(err.to_string()).await;
            inner
                .registry
                .write()
                .await
                .cache
                .invalidate(&entry.cache_key, entry.id);
            outcome
        }
    };

    if let Err(err) = outcome {
        error!(job_id = %entry.id, error = %err, "job lifecycle violation");
    }
}

/// Run the extractor in its own task so that a panicking backend fails the
/// job instead of leaving it `processing`.
async fn extract_records(
    extractor: Arc<dyn ExtractorBackend>,
    transcript: String,
) -> Result<Vec<TaskRecord>> {
    let handle = tokio::spawn(async move { extractor.extract(&transcript).await });

    match handle.await {
        Ok(result) => result.and_then(check_extracted),
        Err(join_err) => Err(InsightError::Extraction(format!(
            "extraction aborted: {join_err}"
        ))),
    }
}
