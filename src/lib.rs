// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod sync;
pub mod types;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dag::{Task, TaskRecord};
use crate::engine::JobManager;
use crate::extract::RuleExtractor;
use crate::sync::{submit_and_wait, JobService, PollOptions, StatusResponse};
use crate::types::JobStatus;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the extractor backend
/// - the job manager
/// - the client polling loop
/// - completions requested on the command line
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))?;
    let transcript = read_transcript(&args.transcript)?;
    let extractor = RuleExtractor::new(cfg.extract.default_priority)?;

    if args.dry_run {
        let records = extractor.parse(&transcript)?;
        print_dry_run(&records, args.json)?;
        return Ok(());
    }

    let manager = JobManager::new(Arc::new(extractor), cfg.service.clone());
    let options = PollOptions::from_config(&cfg);

    let status = submit_and_wait(&manager, &transcript, options).await?;
    let job_id = status.job_id.to_string();
    info!(job_id = %job_id, status = %status.status, "job finished");

    if status.status == JobStatus::Failed {
        print_status(&status, args.json)?;
        bail!(
            "job {job_id} failed: {}",
            status.error.as_deref().unwrap_or("unknown error")
        );
    }

    for task_id in &args.complete {
        match JobService::complete_task(&manager, &job_id, task_id).await {
            Ok(resp) => {
                let ready = resp.updated_tasks.iter().filter(|t| t.is_ready()).count();
                info!(task = %task_id, ready, "task marked complete");
            }
            Err(err) => {
                warn!(task = %task_id, error = %err, "completion rejected");
                eprintln!("cannot complete '{task_id}': {err}");
            }
        }
    }

    let final_status = JobService::get_status(&manager, &job_id).await?;
    print_status(&final_status, args.json)
}

/// Read the transcript from a file, or from stdin for `-`.
fn read_transcript(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading transcript from stdin")?;
        return Ok(buf);
    }

    std::fs::read_to_string(source).with_context(|| format!("reading transcript {source:?}"))
}

/// Dry-run output: the extracted records, no job.
fn print_dry_run(records: &[TaskRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!("insightboard dry-run");
    println!("tasks ({}):", records.len());
    for record in records {
        println!("  - {} ({})", record.id, record.priority);
        println!("      description: {}", record.description);
        if !record.dependencies.is_empty() {
            println!("      depends on: {}", record.dependencies.join(", "));
        }
    }
    Ok(())
}

fn print_status(status: &StatusResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    println!("job {}: {}", status.job_id, status.status);

    if let Some(error) = &status.error {
        println!("  error: {error}");
    }

    if let Some(data) = &status.data {
        if data.has_cycles {
            println!("  cycles:");
            for cycle in &data.cycle_details {
                println!("    - {cycle}");
            }
        }
        println!("  tasks ({}):", data.tasks.len());
        for task in &data.tasks {
            println!("{}", format_task_line(task));
        }
    }

    Ok(())
}

fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "    [{:<9}] {} ({}) {}",
        task.status, task.id, task.priority, task.description
    );
    if !task.dependencies.is_empty() {
        line.push_str(&format!("  <- {}", task.dependencies.join(", ")));
    }
    if let Some(msg) = &task.error_message {
        line.push_str(&format!("  !! {msg}"));
    }
    line
}
