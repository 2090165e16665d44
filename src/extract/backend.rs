// src/extract/backend.rs

//! Pluggable extraction backend abstraction.
//!
//! The job engine talks to an `ExtractorBackend` instead of a concrete
//! parser. Production code uses [`crate::extract::RuleExtractor`]; tests can
//! provide their own implementation that returns fixed records, fails, or
//! waits on a signal.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use crate::dag::TaskRecord;
use crate::errors::{InsightError, Result};

/// Boxed future returned by [`ExtractorBackend::extract`].
pub type ExtractFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<TaskRecord>>> + Send + 'a>>;

/// Trait abstracting how a transcript becomes a task list.
///
/// Extraction may take arbitrary wall-clock time; it is the only genuinely
/// asynchronous step of a job.
pub trait ExtractorBackend: Send + Sync {
    /// Produce task records for `transcript`.
    ///
    /// An `Err` fails the job. Implementations should use
    /// [`InsightError::Extraction`] for content they cannot interpret.
    fn extract<'a>(&'a self, transcript: &'a str) -> ExtractFuture<'a>;
}

/// Checks applied to every extracted task list before a graph is built.
///
/// - the list must not be empty;
/// - every id must be non-blank;
/// - ids must be unique within the list.
///
/// Dangling dependency references are *not* rejected here.
pub fn check_extracted(records: Vec<TaskRecord>) -> Result<Vec<TaskRecord>> {
    if records.is_empty() {
        return Err(InsightError::Extraction(
            "no tasks found in transcript".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for record in &records {
        if record.id.trim().is_empty() {
            return Err(InsightError::Extraction(format!(
                "task with description '{}' has an empty id",
                record.description
            )));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(InsightError::Extraction(format!(
                "duplicate task id '{}'",
                record.id
            )));
        }
    }

    Ok(records)
}
