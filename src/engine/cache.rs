// src/engine/cache.rs

//! Transcript normalisation and the idempotent re-submission cache.

use std::collections::HashMap;

use blake3::Hasher;
use tracing::debug;

use crate::engine::job::JobId;
use crate::errors::{InsightError, Result};

/// Reject submissions that cannot produce a job at all.
pub fn validate_transcript(transcript: &str) -> Result<()> {
    if transcript.trim().is_empty() {
        return Err(InsightError::Validation(
            "transcript must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Normalise a transcript for cache lookups.
///
/// Line endings become `\n` and surrounding whitespace is trimmed. With
/// `collapse_whitespace`, every run of whitespace (newlines included)
/// becomes a single space.
pub fn normalize_transcript(transcript: &str, collapse_whitespace: bool) -> String {
    let unified = transcript.replace("\r\n", "\n").replace('\r', "\n");
    if collapse_whitespace {
        unified.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        unified.trim().to_string()
    }
}

/// Stable cache key for normalised transcript content.
pub fn cache_key(normalized: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(normalized.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Content key -> most recent job submitted with that content.
#[derive(Debug, Default)]
pub struct TranscriptCache {
    jobs: HashMap<String, JobId>,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<JobId> {
        self.jobs.get(key).copied()
    }

    pub fn insert(&mut self, key: String, job: JobId) {
        debug!(key = %key, job_id = %job, "caching transcript key");
        self.jobs.insert(key, job);
    }

    /// Forget `key` if it still points at `job`.
    ///
    /// A newer job submitted with the same content keeps its entry.
    pub fn invalidate(&mut self, key: &str, job: JobId) {
        if self.jobs.get(key) == Some(&job) {
            self.jobs.remove(key);
            debug!(key = %key, job_id = %job, "invalidated transcript key");
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
