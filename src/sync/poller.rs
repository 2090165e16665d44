// src/sync/poller.rs

//! Client-side polling discipline.
//!
//! Poll `get_status` at a fixed interval until the job is `completed` or
//! `failed`, and stop immediately once it is. Retryable (transport) errors
//! are tolerated unless they recur `max_consecutive_errors` times in a row;
//! any other error ends polling at once.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::sync::protocol::{JobService, StatusResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_consecutive_errors: u32,
}

impl PollOptions {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            interval: cfg.poll_interval(),
            max_consecutive_errors: cfg.poll.max_consecutive_errors,
        }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from_config(&ConfigFile::default())
    }
}

/// Poll until the job reaches a terminal status.
pub async fn poll_until_terminal<S>(
    service: &S,
    job_id: &str,
    options: PollOptions,
) -> Result<StatusResponse>
where
    S: JobService + ?Sized,
{
    let mut consecutive_errors = 0u32;
    let mut polls = 0u64;

    loop {
        polls += 1;
        match service.get_status(job_id).await {
            Ok(resp) if resp.status.is_terminal() => {
                debug!(job_id = %job_id, status = %resp.status, polls, "job reached terminal status");
                return Ok(resp);
            }
            Ok(resp) => {
                consecutive_errors = 0;
                debug!(job_id = %job_id, status = %resp.status, "job still running");
            }
            Err(err) if err.is_retryable() => {
                consecutive_errors += 1;
                warn!(
                    job_id = %job_id,
                    error = %err,
                    consecutive_errors,
                    "status poll failed; will retry"
                );
                if consecutive_errors >= options.max_consecutive_errors {
                    return Err(err);
                }
            }
            Err(err) => return Err(err),
        }

        tokio::time::sleep(options.interval).await;
    }
}

/// Submit a transcript and follow the job to a terminal status.
///
/// A cached or fast-path answer that is already terminal is returned
/// without polling.
pub async fn submit_and_wait<S>(
    service: &S,
    transcript: &str,
    options: PollOptions,
) -> Result<StatusResponse>
where
    S: JobService + ?Sized,
{
    let submitted = service.submit(transcript).await?;
    debug!(
        job_id = %submitted.job_id,
        status = %submitted.status,
        cached = submitted.cached,
        "transcript submitted"
    );

    if submitted.status.is_terminal() {
        return Ok(StatusResponse::from(submitted));
    }

    let job_id = submitted.job_id.to_string();
    poll_until_terminal(service, &job_id, options).await
}
