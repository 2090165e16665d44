// tests/sync_poller.rs

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use insightboard::engine::JobManager;
use insightboard::errors::InsightError;
use insightboard::sync::{
    poll_until_terminal, CompleteTaskResponse, JobService, JobSummary, PollOptions,
    ServiceFuture, StatusResponse, SubmitResponse,
};
use insightboard::types::JobStatus;
use insightboard_test_utils::builders::{service_section, TaskListBuilder};
use insightboard_test_utils::fake_extractor::FixedExtractor;
use insightboard_test_utils::{init_tracing, with_timeout};

use common::TestResult;

/// Wraps a real manager and fails the first `failures` status calls.
struct FlakyService {
    inner: JobManager,
    failures: u32,
    status_calls: AtomicU32,
}

impl FlakyService {
    fn new(failures: u32) -> Self {
        Self {
            inner: JobManager::new(
                Arc::new(FixedExtractor::new(
                    TaskListBuilder::new().task("A", &[]).build(),
                )),
                service_section(),
            ),
            failures,
            status_calls: AtomicU32::new(0),
        }
    }
}

impl JobService for FlakyService {
    fn submit<'a>(&'a self, transcript: &'a str) -> ServiceFuture<'a, SubmitResponse> {
        JobService::submit(&self.inner, transcript)
    }

    fn get_status<'a>(&'a self, job_id: &'a str) -> ServiceFuture<'a, StatusResponse> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Box::pin(async move {
                Err(InsightError::Transport(format!("connection reset (call {call})")))
            });
        }
        JobService::get_status(&self.inner, job_id)
    }

    fn complete_task<'a>(
        &'a self,
        job_id: &'a str,
        task_id: &'a str,
    ) -> ServiceFuture<'a, CompleteTaskResponse> {
        JobService::complete_task(&self.inner, job_id, task_id)
    }

    fn list_jobs(&self) -> ServiceFuture<'_, Vec<JobSummary>> {
        JobService::list_jobs(&self.inner)
    }
}

fn options(max_consecutive_errors: u32) -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(5),
        max_consecutive_errors,
    }
}

#[tokio::test]
async fn transient_errors_are_retried() -> TestResult {
    init_tracing();
    let service = FlakyService::new(2);

    let submitted = JobService::submit(&service, "notes").await?;
    let job_id = submitted.job_id.to_string();

    let status = with_timeout(poll_until_terminal(&service, &job_id, options(3))).await?;

    assert_eq!(status.status, JobStatus::Completed);
    assert!(service.status_calls.load(Ordering::SeqCst) >= 3);
    Ok(())
}

#[tokio::test]
async fn polling_gives_up_after_too_many_consecutive_errors() -> TestResult {
    init_tracing();
    let service = FlakyService::new(10);

    let submitted = JobService::submit(&service, "notes").await?;
    let job_id = submitted.job_id.to_string();

    let result = with_timeout(poll_until_terminal(&service, &job_id, options(3))).await;

    assert!(matches!(result, Err(InsightError::Transport(_))));
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn non_retryable_errors_stop_polling_at_once() -> TestResult {
    init_tracing();
    let service = FlakyService::new(0);

    let result = with_timeout(poll_until_terminal(
        &service,
        "00000000-0000-0000-0000-000000000000",
        options(5),
    ))
    .await;

    assert!(matches!(result, Err(InsightError::NotFound(_))));
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn polling_stops_once_terminal() -> TestResult {
    init_tracing();
    let service = FlakyService::new(0);

    let submitted = JobService::submit(&service, "notes").await?;
    let job_id = submitted.job_id.to_string();

    with_timeout(poll_until_terminal(&service, &job_id, options(3))).await?;
    let calls = service.status_calls.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(service.status_calls.load(Ordering::SeqCst), calls);
    Ok(())
}
