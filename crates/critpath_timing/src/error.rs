//! Errors raised while building a circuit graph or searching it.

/// Failure modes of [`CircuitGraph`](crate::CircuitGraph) construction and
/// [`CriticalPathAnalyzer::find_critical_path`](crate::CriticalPathAnalyzer::find_critical_path).
///
/// Every variant leaves the graph untouched. Callers that want a result
/// regardless can fall back to [`CriticalPath::default`](crate::CriticalPath),
/// the empty path with zero delay.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimingError {
    /// The graph has a combinational cycle, so no topological order exists.
    #[error("circuit contains a combinational cycle through {}", .nodes.join(", "))]
    CyclicGraph {
        /// Names of the nodes that lie on a cycle, in insertion order.
        nodes: Vec<String>,
    },

    /// The graph has no node of type OUTPUT.
    #[error("circuit has no OUTPUT node")]
    NoOutputNode,

    /// OUTPUT nodes exist but none is reachable from an INPUT.
    #[error("no OUTPUT node is reachable from an INPUT: {}", .outputs.join(", "))]
    UnreachableOutputs {
        /// Names of the unreachable OUTPUT nodes.
        outputs: Vec<String>,
    },

    /// A node with this name was already added.
    #[error("node `{name}` is already defined")]
    DuplicateNode {
        /// The duplicated node name.
        name: String,
    },

    /// An edge endpoint names a node that was never added.
    #[error("node `{name}` is not defined")]
    UnknownNode {
        /// The missing node name.
        name: String,
    },
}
