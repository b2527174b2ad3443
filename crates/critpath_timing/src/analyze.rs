//! Longest-delay path search over a circuit graph.
//!
//! The search runs in three passes, each linear in nodes plus edges:
//!
//! 1. Kahn's algorithm produces a topological order, or reports the nodes
//!    that sit on a combinational cycle.
//! 2. Nodes are relaxed in that order. INPUT nodes arrive at time 0, every
//!    other node starts unreached, and a reached node pushes
//!    `arrival + own delay` to each successor, remembering the predecessor
//!    that produced the best arrival.
//! 3. The latest-arriving reachable OUTPUT is the terminal; walking the
//!    predecessor chain back from it yields the path.
//!
//! Every tie is broken by topological order: a later candidate must be
//! strictly better to replace an earlier one. Because the ready queue is
//! seeded and drained in node insertion order, results are deterministic
//! for a given graph.

use crate::component::{ComponentType, DelayTable};
use crate::error::TimingError;
use crate::graph::CircuitGraph;
use crate::ids::NodeId;
use crate::report::{CriticalPath, PathElement};
use std::collections::VecDeque;

/// Finds the critical path of circuit graphs using a fixed delay table.
///
/// The analyzer holds no state besides its delay table, so one instance
/// can analyze any number of graphs, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct CriticalPathAnalyzer {
    delays: DelayTable,
}

impl CriticalPathAnalyzer {
    /// Creates an analyzer that prices components with `delays`.
    pub fn new(delays: DelayTable) -> Self {
        Self { delays }
    }

    /// Returns the delay table.
    pub fn delays(&self) -> &DelayTable {
        &self.delays
    }

    /// Returns the delay of one component, zero if it has no table entry.
    pub fn delay_of(&self, component: &ComponentType) -> f64 {
        self.delays.delay(component)
    }

    /// Computes the longest-delay path from any INPUT to the latest OUTPUT.
    ///
    /// # Errors
    ///
    /// - [`TimingError::CyclicGraph`] if the graph has a cycle.
    /// - [`TimingError::NoOutputNode`] if there is no OUTPUT node.
    /// - [`TimingError::UnreachableOutputs`] if no OUTPUT can be reached
    ///   from an INPUT.
    pub fn find_critical_path(&self, graph: &CircuitGraph) -> Result<CriticalPath, TimingError> {
        let order = topological_order(graph)?;

        let outputs = graph.output_nodes();
        if outputs.is_empty() {
            return Err(TimingError::NoOutputNode);
        }

        let (arrival, predecessor) = self.propagate(graph, &order);

        let mut terminal: Option<NodeId> = None;
        for &id in &order {
            if !graph.node(id).component.is_output() || arrival[id.index()] == f64::NEG_INFINITY {
                continue;
            }
            if terminal.map_or(true, |best| arrival[id.index()] > arrival[best.index()]) {
                terminal = Some(id);
            }
        }
        let Some(terminal) = terminal else {
            return Err(TimingError::UnreachableOutputs {
                outputs: outputs
                    .iter()
                    .map(|&id| graph.node(id).name.clone())
                    .collect(),
            });
        };

        let mut chain = vec![terminal];
        let mut current = terminal;
        while let Some(prev) = predecessor[current.index()] {
            chain.push(prev);
            current = prev;
        }
        chain.reverse();

        let mut cumulative = 0.0;
        let elements = chain
            .into_iter()
            .map(|id| {
                let node = graph.node(id);
                let delay = self.delay_of(&node.component);
                cumulative += delay;
                PathElement {
                    node: node.name.clone(),
                    component: node.component.clone(),
                    delay,
                    cumulative,
                }
            })
            .collect();

        Ok(CriticalPath {
            elements,
            total_delay: arrival[terminal.index()],
        })
    }

    /// Sums the configured delays of the named nodes.
    ///
    /// Independent of any search state; names that are not in the graph
    /// count as [`ComponentType::Unknown`] and add nothing.
    pub fn path_delay<S: AsRef<str>>(&self, graph: &CircuitGraph, path: &[S]) -> f64 {
        path.iter()
            .map(|name| self.delay_of(graph.type_of(name.as_ref())))
            .sum()
    }

    /// Relaxes every edge in topological order, returning the arrival time
    /// and best predecessor of each node.
    fn propagate(
        &self,
        graph: &CircuitGraph,
        order: &[NodeId],
    ) -> (Vec<f64>, Vec<Option<NodeId>>) {
        let mut arrival = vec![f64::NEG_INFINITY; graph.node_count()];
        for input in graph.input_nodes() {
            arrival[input.index()] = 0.0;
        }
        let mut predecessor: Vec<Option<NodeId>> = vec![None; graph.node_count()];

        for &id in order {
            let here = arrival[id.index()];
            // Unreached nodes must not turn -inf into a finite arrival downstream.
            if here == f64::NEG_INFINITY {
                continue;
            }
            let candidate = here + self.delay_of(&graph.node(id).component);
            for &succ in graph.successors(id) {
                if candidate > arrival[succ.index()] {
                    arrival[succ.index()] = candidate;
                    predecessor[succ.index()] = Some(id);
                }
            }
        }

        (arrival, predecessor)
    }
}

/// Returns the nodes of `graph` in topological order.
///
/// Zero in-degree nodes are queued in insertion order and the queue is
/// drained first-in first-out, so the order is stable for a given graph.
///
/// # Errors
///
/// [`TimingError::CyclicGraph`] listing the nodes that lie on a cycle.
pub fn topological_order(graph: &CircuitGraph) -> Result<Vec<NodeId>, TimingError> {
    let mut in_degree: Vec<usize> = graph
        .nodes()
        .map(|id| graph.predecessors(id).len())
        .collect();

    let mut queue: VecDeque<NodeId> = graph.nodes().filter(|id| in_degree[id.index()] == 0).collect();
    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(id) = queue.pop_front() {
        order.push(id);
        for &succ in graph.successors(id) {
            in_degree[succ.index()] -= 1;
            if in_degree[succ.index()] == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() == graph.node_count() {
        Ok(order)
    } else {
        Err(TimingError::CyclicGraph {
            nodes: cycle_members(graph, &in_degree),
        })
    }
}

/// Narrows the nodes Kahn's algorithm could not order down to those on a
/// cycle, by peeling off leftover nodes that have no leftover successor.
fn cycle_members(graph: &CircuitGraph, in_degree: &[usize]) -> Vec<String> {
    let mut remaining: Vec<bool> = in_degree.iter().map(|&d| d > 0).collect();
    let mut out_degree: Vec<usize> = graph
        .nodes()
        .map(|id| {
            graph
                .successors(id)
                .iter()
                .filter(|s| remaining[s.index()])
                .count()
        })
        .collect();

    let mut stack: Vec<NodeId> = graph
        .nodes()
        .filter(|id| remaining[id.index()] && out_degree[id.index()] == 0)
        .collect();
    while let Some(id) = stack.pop() {
        remaining[id.index()] = false;
        for &pred in graph.predecessors(id) {
            if remaining[pred.index()] {
                out_degree[pred.index()] -= 1;
                if out_degree[pred.index()] == 0 {
                    stack.push(pred);
                }
            }
        }
    }

    graph
        .iter()
        .filter(|n| remaining[n.id.index()])
        .map(|n| n.name.clone())
        .collect()
}
