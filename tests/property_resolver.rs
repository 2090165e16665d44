// tests/property_resolver.rs

use std::collections::HashSet;

use insightboard::dag::{detect_cycles, resolve_statuses, TaskGraph, TaskId};
use insightboard::engine::JobCore;
use insightboard::types::TaskStatus;
use insightboard_test_utils::builders::TaskListBuilder;
use proptest::prelude::*;

// Strategy to generate an acyclic task list.
// Acyclicity is guaranteed by only letting task N depend on tasks 0..N-1.
fn acyclic_graph_strategy(max_tasks: usize) -> impl Strategy<Value = TaskGraph> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        );

        deps_strat.prop_map(move |raw_deps| {
            let mut builder = TaskListBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let deps: Vec<String> = if i == 0 {
                    Vec::new()
                } else {
                    potential_deps
                        .into_iter()
                        .map(|d| format!("task_{}", d % i))
                        .collect()
                };
                let dep_refs: Vec<&str> = deps.iter().map(|s| s.as_str()).collect();
                builder = builder.task(&format!("task_{i}"), &dep_refs);
            }
            builder.graph()
        })
    })
}

// Arbitrary dependency lists, cycles and dangling references included.
fn any_graph_strategy(max_tasks: usize) -> impl Strategy<Value = TaskGraph> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(0..num_tasks + 2, 0..4),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            let mut builder = TaskListBuilder::new();
            for (i, deps) in raw_deps.into_iter().enumerate() {
                // Indices past the end become dangling references.
                let deps: Vec<String> = deps.into_iter().map(|d| format!("task_{d}")).collect();
                let dep_refs: Vec<&str> = deps.iter().map(|s| s.as_str()).collect();
                builder = builder.task(&format!("task_{i}"), &dep_refs);
            }
            builder.graph()
        })
    })
}

/// Whether `start` can get back to itself through tasks that exist.
fn reaches_itself(graph: &TaskGraph, start: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = graph.neighbors(start).iter().map(|s| s.as_str()).collect();

    while let Some(id) = stack.pop() {
        if !graph.exists(id) || !seen.insert(id) {
            continue;
        }
        if id == start {
            return true;
        }
        stack.extend(graph.neighbors(id).iter().map(|s| s.as_str()));
    }
    false
}

proptest! {
    #[test]
    fn acyclic_graphs_resolve_ready_or_blocked(
        graph in acyclic_graph_strategy(12),
        completed_mask in proptest::collection::vec(any::<bool>(), 12),
    ) {
        let cycles = detect_cycles(&graph);
        prop_assert!(!cycles.has_cycles());

        let ids: Vec<&str> = graph.all_ids().collect();
        let completed: HashSet<TaskId> = ids
            .iter()
            .zip(completed_mask.iter())
            .filter(|(_, done)| **done)
            .map(|(id, _)| id.to_string())
            .collect();

        let statuses = resolve_statuses(&graph, &cycles, &completed);

        for id in &ids {
            let status = statuses.status_of(id);
            let expected = if completed.contains(*id) {
                TaskStatus::Completed
            } else if graph.neighbors(id).iter().all(|d| completed.contains(d)) {
                TaskStatus::Ready
            } else {
                TaskStatus::Blocked
            };
            prop_assert_eq!(status, Some(expected), "task {}", id);
        }
    }

    #[test]
    fn every_cycle_member_is_an_error(graph in any_graph_strategy(10)) {
        let cycles = detect_cycles(&graph);
        let statuses = resolve_statuses(&graph, &cycles, &HashSet::new());

        prop_assert_eq!(cycles.has_cycles(), !cycles.details().is_empty());

        for cycle in cycles.cycles() {
            // Each reported cycle really is a loop in the graph.
            let nodes = cycle.nodes();
            for (i, node) in nodes.iter().enumerate() {
                let next = &nodes[(i + 1) % nodes.len()];
                prop_assert!(graph.neighbors(node).contains(next));
            }
        }

        // Ground truth from the graph itself, independent of the detector.
        for id in graph.all_ids() {
            let on_loop = reaches_itself(&graph, id);
            let is_error = statuses.status_of(id) == Some(TaskStatus::Error);
            prop_assert_eq!(is_error, on_loop, "task {}", id);
            if on_loop {
                prop_assert!(cycles.has_cycles());
                prop_assert!(statuses.get(id).is_some_and(|r| r.error_message.is_some()));
            }
        }
    }

    #[test]
    fn completions_are_monotonic(
        graph in any_graph_strategy(10),
        picks in proptest::collection::vec(any::<usize>(), 1..20),
    ) {
        let records: Vec<_> = graph.records().cloned().collect();
        let mut core = JobCore::from_records(records);
        let mut done: Vec<String> = Vec::new();

        for pick in picks {
            let ids: Vec<String> = core.graph().all_ids().map(|s| s.to_string()).collect();
            let id = &ids[pick % ids.len()];
            let before = core.tasks();

            match core.complete(id) {
                Ok(step) => {
                    done.push(id.clone());
                    // Nothing ever turns into an error through a completion.
                    for (old, new) in before.iter().zip(step.updated_tasks.iter()) {
                        if new.status == TaskStatus::Error {
                            prop_assert_eq!(old.status, TaskStatus::Error);
                        }
                    }
                }
                Err(_) => {
                    // A rejected completion leaves every status untouched.
                    prop_assert_eq!(before, core.tasks());
                }
            }

            for id in &done {
                prop_assert_eq!(core.status_of(id), Some(TaskStatus::Completed));
            }
        }
    }
}
