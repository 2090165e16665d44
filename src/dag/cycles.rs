// src/dag/cycles.rs

//! Cycle detection over the dependency relation.
//!
//! Depth-first traversal with a tri-state mark per node. Reaching a node that
//! is still in progress closes a cycle, which is read back from the active
//! traversal stack. Nodes marked done are never explored again, so every
//! back edge is examined exactly once and the whole pass is O(V + E).
//!
//! The outer loop visits tasks in the order they were provided, which makes
//! the reported cycles (and their starting nodes) deterministic.
//!
//! Back edges alone can miss members: a loop closed through a node that is
//! already done yields no back edge of its own. After the walk, every node
//! in a non-trivial strongly connected component is therefore attributed to
//! a reported cycle from the same component.

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task_info::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// One dependency cycle: the ids traversed before returning to the first.
///
/// A self-dependency is a cycle of length 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    nodes: Vec<TaskId>,
}

impl Cycle {
    pub fn nodes(&self) -> &[TaskId] {
        &self.nodes
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Human-readable loop, e.g. `A → B → C → A`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = self.nodes.iter().map(|s| s.as_str()).collect();
        if let Some(first) = self.nodes.first() {
            parts.push(first.as_str());
        }
        parts.join(" → ")
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// All cycles found in a graph, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    cycles: Vec<Cycle>,
    /// Task id -> index of the reported cycle it is attributed to.
    membership: HashMap<TaskId, usize>,
}

impl CycleReport {
    fn from_cycles(cycles: Vec<Cycle>) -> Self {
        let mut membership = HashMap::new();
        for (idx, cycle) in cycles.iter().enumerate() {
            for node in cycle.nodes() {
                membership.entry(node.clone()).or_insert(idx);
            }
        }
        Self { cycles, membership }
    }

    /// Attribute every node of a cyclic component to the earliest reported
    /// cycle inside that component.
    fn cover_components(&mut self, graph: &TaskGraph) {
        let mut edges: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in graph.all_ids() {
            edges.add_node(id);
            for dep in graph.neighbors(id) {
                if graph.exists(dep) {
                    edges.add_edge(id, dep.as_str(), ());
                }
            }
        }

        for component in tarjan_scc(&edges) {
            if component.len() < 2 {
                // A lone node is cyclic only through a self-dependency,
                // which the walk always reports.
                continue;
            }

            let Some(idx) = component
                .iter()
                .filter_map(|id| self.membership.get(*id).copied())
                .min()
            else {
                warn!(size = component.len(), "cyclic component without a reported cycle");
                continue;
            };

            for id in component {
                if !self.membership.contains_key(id) {
                    debug!(task = %id, cycle = %self.cycles[idx], "task closes a loop through a reported cycle");
                    self.membership.insert(id.to_string(), idx);
                }
            }
        }
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Whether `id` lies on a dependency cycle.
    pub fn is_member(&self, id: &str) -> bool {
        self.membership.contains_key(id)
    }

    /// The first reported cycle containing `id`, or for a member that no
    /// reported cycle lists, the earliest one from its component.
    pub fn cycle_of(&self, id: &str) -> Option<&Cycle> {
        self.membership.get(id).and_then(|&idx| self.cycles.get(idx))
    }

    /// One description per cycle, in discovery order.
    pub fn details(&self) -> Vec<String> {
        self.cycles.iter().map(Cycle::describe).collect()
    }
}

/// Find every cycle reachable by the deterministic depth-first pass.
///
/// Dependencies naming ids that are not in the graph are skipped; they
/// cannot take part in a cycle.
pub fn detect_cycles(graph: &TaskGraph) -> CycleReport {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for start in graph.all_ids() {
        if marks.contains_key(start) {
            continue;
        }

        // Each frame is (node, index of the next dependency to look at).
        // The frames double as the active traversal path.
        let mut frames: Vec<(&str, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::InProgress);

        loop {
            let next = match frames.last_mut() {
                None => break,
                Some((node, idx)) => {
                    let deps = graph.neighbors(node);
                    if *idx < deps.len() {
                        let dep = deps[*idx].as_str();
                        *idx += 1;
                        Some(dep)
                    } else {
                        None
                    }
                }
            };

            match next {
                Some(dep) => {
                    if !graph.exists(dep) {
                        continue;
                    }
                    match marks.get(dep) {
                        None => {
                            marks.insert(dep, Mark::InProgress);
                            frames.push((dep, 0));
                        }
                        Some(Mark::InProgress) => {
                            if let Some(pos) = frames.iter().position(|(n, _)| *n == dep) {
                                let nodes: Vec<TaskId> =
                                    frames[pos..].iter().map(|(n, _)| n.to_string()).collect();
                                let cycle = Cycle { nodes };
                                debug!(cycle = %cycle, "dependency cycle detected");
                                cycles.push(cycle);
                            }
                        }
                        Some(Mark::Done) => {}
                    }
                }
                None => {
                    if let Some((node, _)) = frames.pop() {
                        marks.insert(node, Mark::Done);
                    }
                }
            }
        }
    }

    let mut report = CycleReport::from_cycles(cycles);
    report.cover_components(graph);
    report
}
