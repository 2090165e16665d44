// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::Priority;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [service]
/// max_concurrent_jobs = 4
/// fast_path_ms = 0
/// cache_enabled = true
/// collapse_whitespace = true
///
/// [poll]
/// interval_ms = 250
/// max_consecutive_errors = 5
///
/// [extract]
/// default_priority = "medium"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub extract: ExtractSection,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` or `ConfigFile::default()`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub service: ServiceSection,
    pub poll: PollSection,
    pub extract: ExtractSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        service: ServiceSection,
        poll: PollSection,
        extract: ExtractSection,
    ) -> Self {
        Self {
            service,
            poll,
            extract,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ServiceSection::default(),
            PollSection::default(),
            ExtractSection::default(),
        )
    }
}

/// `[service]` section: job engine behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    /// Upper bound on jobs extracting at the same time.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Milliseconds `submit` waits for a terminal status. `0` disables the
    /// fast path.
    #[serde(default)]
    pub fast_path_ms: u64,

    /// Whether identical transcripts reuse an existing job.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Collapse whitespace runs when computing the cache key, so transcripts
    /// that differ only in spacing share a job.
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,
}

impl ServiceSection {
    /// How long `submit` waits for a job to finish before answering.
    pub fn fast_path(&self) -> Duration {
        Duration::from_millis(self.fast_path_ms)
    }
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            fast_path_ms: 0,
            cache_enabled: true,
            collapse_whitespace: true,
        }
    }
}

/// `[poll]` section: client polling discipline.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Consecutive retryable errors tolerated before polling gives up.
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
}

fn default_interval_ms() -> u64 {
    250
}

fn default_max_consecutive_errors() -> u32 {
    5
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_consecutive_errors: default_max_consecutive_errors(),
        }
    }
}

/// `[extract]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractSection {
    /// Priority given to extracted tasks that do not state one.
    #[serde(default)]
    pub default_priority: Priority,
}
