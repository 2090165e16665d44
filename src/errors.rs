// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Graph-level findings (cycles, dangling references) are never errors; they
//! are reported as task data. Only lifecycle and request-level problems end
//! up here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    /// The extraction step could not turn the transcript into tasks.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Malformed submission, rejected before a job is created.
    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A transport-level failure seen by a polling client.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InsightError {
    /// Whether a client may retry the call that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InsightError::Transport(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, InsightError>;
