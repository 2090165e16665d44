// src/dag/mod.rs

//! Task graph and the pure computations over it.
//!
//! - [`graph`] holds tasks and their dependency edges.
//! - [`cycles`] finds every dependency cycle.
//! - [`resolver`] derives a status for each task from the topology, the
//!   cycle report and the set of completed tasks.
//! - [`task_info`] provides the task record and resolved task types.
//!
//! Nothing in here performs IO or blocks.

pub mod cycles;
pub mod graph;
pub mod resolver;
pub mod task_info;

pub use cycles::{detect_cycles, Cycle, CycleReport};
pub use graph::TaskGraph;
pub use resolver::{resolve_statuses, tasks_with_status, Resolution, StatusMap};
pub use task_info::{Task, TaskId, TaskRecord};
