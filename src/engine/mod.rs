// src/engine/mod.rs

//! Job engine.
//!
//! This module ties together:
//! - the job snapshot and its lifecycle (`pending -> processing ->
//!   completed | failed`)
//! - the idempotent transcript cache
//! - the per-job graph state and task completion handling
//! - the async manager that runs each job's pipeline
//!
//! The pure per-job state machine lives in [`core`]; the async shell with
//! locking, spawning and snapshot publication is in [`runtime`].

pub mod cache;
pub mod core;
pub mod job;
pub mod runtime;

pub use cache::{cache_key, normalize_transcript, validate_transcript, TranscriptCache};
pub use core::{CompletionStep, JobCore};
pub use job::{JobId, JobSnapshot};
pub use runtime::{JobManager, Submission};
