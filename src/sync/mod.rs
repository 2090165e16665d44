// src/sync/mod.rs

//! Client sync contract.
//!
//! - [`protocol`] defines the transport-agnostic request/response shapes and
//!   the [`JobService`] trait (`submit`, `get_status`, `complete_task`,
//!   `list_jobs`), implemented in-process by `JobManager`.
//! - [`poller`] implements the polling discipline a client follows to observe
//!   a job until it reaches a terminal status.

pub mod poller;
pub mod protocol;

pub use poller::{poll_until_terminal, submit_and_wait, PollOptions};
pub use protocol::{
    CompleteTaskResponse, JobData, JobService, JobSummary, ServiceFuture, StatusResponse,
    SubmitResponse,
};
