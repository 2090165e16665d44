// src/extract/rules.rs

//! Rule-based extraction.
//!
//! Two input shapes are understood:
//!
//! 1. A JSON task list, either a bare array or `{"tasks": [...]}`, with
//!    `id`, `description`, optional `priority` and optional `dependencies`.
//! 2. Free text in which action items are written one per line:
//!
//!    ```text
//!    - [T1] (urgent) Fix Stripe failures under load
//!    - [T2] (high) Add load test to CI (after: T1)
//!    3. [T3] Review launch blog post (depends on: T2, T9)
//!    ```
//!
//!    The bullet, the priority and the dependency clause are optional. Lines
//!    that do not look like action items are ignored.

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::dag::{TaskId, TaskRecord};
use crate::errors::{Error, InsightError, Result};
use crate::extract::backend::{ExtractFuture, ExtractorBackend};
use crate::types::Priority;

const ACTION_LINE: &str = r"(?i)^\s*(?:[-*]|\d+[.)])?\s*\[(?P<id>[A-Za-z0-9_.\-]+)\]\s*(?:\((?P<priority>low|medium|high|urgent)\)\s*)?(?P<desc>.+?)\s*(?:\((?:after|depends on|deps):\s*(?P<deps>[^)]*)\))?\s*$";

#[derive(Debug, Deserialize)]
struct JsonTask {
    id: TaskId,
    description: String,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    dependencies: Vec<TaskId>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTaskList {
    Bare(Vec<JsonTask>),
    Wrapped { tasks: Vec<JsonTask> },
}

/// Extractor for JSON task lists and action-item lines.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    default_priority: Priority,
    action_line: Regex,
}

impl RuleExtractor {
    pub fn new(default_priority: Priority) -> Result<Self> {
        let action_line = Regex::new(ACTION_LINE).map_err(Error::from)?;
        Ok(Self {
            default_priority,
            action_line,
        })
    }

    /// Synchronous core of [`ExtractorBackend::extract`].
    pub fn parse(&self, transcript: &str) -> Result<Vec<TaskRecord>> {
        let trimmed = transcript.trim();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return self.parse_json(trimmed);
        }
        Ok(self.parse_lines(trimmed))
    }

    fn parse_json(&self, text: &str) -> Result<Vec<TaskRecord>> {
        let list: JsonTaskList = serde_json::from_str(text)
            .map_err(|e| InsightError::Extraction(format!("malformed task list: {e}")))?;

        let tasks = match list {
            JsonTaskList::Bare(tasks) | JsonTaskList::Wrapped { tasks } => tasks,
        };

        debug!(count = tasks.len(), "parsed JSON task list");

        Ok(tasks
            .into_iter()
            .map(|t| TaskRecord {
                id: t.id.trim().to_string(),
                description: t.description.trim().to_string(),
                priority: t.priority.unwrap_or(self.default_priority),
                dependencies: t
                    .dependencies
                    .into_iter()
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect(),
            })
            .collect())
    }

    fn parse_lines(&self, text: &str) -> Vec<TaskRecord> {
        let mut records = Vec::new();

        for line in text.lines() {
            let Some(caps) = self.action_line.captures(line) else {
                continue;
            };

            let id = caps["id"].to_string();
            let priority = caps
                .name("priority")
                .and_then(|m| m.as_str().parse::<Priority>().ok())
                .unwrap_or(self.default_priority);
            let dependencies = caps
                .name("deps")
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            records.push(TaskRecord {
                id,
                description: caps["desc"].trim().to_string(),
                priority,
                dependencies,
            });
        }

        debug!(count = records.len(), "parsed action-item lines");
        records
    }
}

impl ExtractorBackend for RuleExtractor {
    fn extract<'a>(&'a self, transcript: &'a str) -> ExtractFuture<'a> {
        Box::pin(async move { self.parse(transcript) })
    }
}
