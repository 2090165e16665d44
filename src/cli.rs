// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `insightboard`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "insightboard",
    version,
    about = "Turn a meeting transcript into a dependency-aware task list.",
    long_about = None
)]
pub struct CliArgs {
    /// Transcript file to process, or `-` to read from stdin.
    #[arg(value_name = "TRANSCRIPT")]
    pub transcript: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Insightboard.toml` in the current working directory, if it
    /// exists; built-in defaults otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Mark a task as completed once the job has finished. Repeatable;
    /// applied in the order given.
    #[arg(long = "complete", value_name = "TASK_ID")]
    pub complete: Vec<String>,

    /// Print the final job status as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `INSIGHTBOARD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Only run extraction and print the extracted tasks.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
