//! The circuit dependency graph.
//!
//! A [`CircuitGraph`] is an arena of typed nodes connected by directed,
//! unweighted edges from a producing node to each node that consumes its
//! output. Delay lives on nodes, not edges: the analyzer prices each node
//! through its [`ComponentType`].
//!
//! Graphs are built once (usually by the netlist parser) and only read
//! afterwards, so a graph can be shared across threads without locking.

use crate::component::ComponentType;
use crate::error::TimingError;
use crate::ids::NodeId;
use serde::Serialize;
use std::collections::HashMap;

static UNKNOWN: ComponentType = ComponentType::Unknown;

/// A directed graph of circuit components.
///
/// Node names are unique. Adjacency is kept in both directions; repeated
/// edges between the same pair of nodes are stored once.
///
/// Graphs serialize for reports but are only ever built through
/// [`add_node`](Self::add_node) and [`add_edge`](Self::add_edge), which keep
/// the arena, adjacency and name index in step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CircuitGraph {
    nodes: Vec<CircuitNode>,
    successors: Vec<Vec<NodeId>>,
    predecessors: Vec<Vec<NodeId>>,
    index: HashMap<String, NodeId>,
    edge_count: usize,
}

/// A node in the circuit graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitNode {
    /// The arena ID of this node.
    pub id: NodeId,
    /// The node's unique name from the circuit description.
    pub name: String,
    /// The component this node represents.
    pub component: ComponentType,
}

impl CircuitGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its ID.
    ///
    /// Fails with [`TimingError::DuplicateNode`] if the name is taken; the
    /// existing node is left unchanged.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        component: ComponentType,
    ) -> Result<NodeId, TimingError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(TimingError::DuplicateNode { name });
        }
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.index.insert(name.clone(), id);
        self.nodes.push(CircuitNode {
            id,
            name,
            component,
        });
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        Ok(id)
    }

    /// Adds an edge from the node named `from` to the node named `to`.
    ///
    /// Both nodes must already exist, otherwise [`TimingError::UnknownNode`]
    /// names the first missing endpoint.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), TimingError> {
        let from_id = self.require(from)?;
        let to_id = self.require(to)?;
        self.add_edge_ids(from_id, to_id);
        Ok(())
    }

    /// Adds an edge between two existing nodes.
    ///
    /// Returns `false` if the edge was already present.
    ///
    /// # Panics
    ///
    /// Panics if either ID was not produced by this graph.
    pub fn add_edge_ids(&mut self, from: NodeId, to: NodeId) -> bool {
        if self.successors[from.index()].contains(&to) {
            return false;
        }
        self.successors[from.index()].push(to);
        self.predecessors[to.index()].push(from);
        self.edge_count += 1;
        true
    }

    fn require(&self, name: &str) -> Result<NodeId, TimingError> {
        self.find(name).ok_or_else(|| TimingError::UnknownNode {
            name: name.to_string(),
        })
    }

    /// Looks up a node ID by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Returns the node with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not produced by this graph.
    pub fn node(&self, id: NodeId) -> &CircuitNode {
        &self.nodes[id.index()]
    }

    /// Returns the component type of the node named `name`.
    ///
    /// Names that were never added yield [`ComponentType::Unknown`] rather
    /// than an error.
    pub fn type_of(&self, name: &str) -> &ComponentType {
        self.find(name)
            .map_or(&UNKNOWN, |id| &self.nodes[id.index()].component)
    }

    /// Returns all node IDs in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Iterates over every node in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CircuitNode> {
        self.nodes.iter()
    }

    /// Returns the nodes that consume the output of `id`.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.successors[id.index()]
    }

    /// Returns the nodes whose outputs feed `id`.
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        &self.predecessors[id.index()]
    }

    /// Returns `true` if there is an edge from `from` to `to`.
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.successors[from.index()].contains(&to)
    }

    /// Iterates over every edge as `(from, to)`, grouped by source node.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(from, succ)| {
                succ.iter()
                    .map(move |&to| (NodeId::from_raw(from as u32), to))
            })
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns all INPUT nodes in insertion order.
    pub fn input_nodes(&self) -> Vec<NodeId> {
        self.nodes_where(ComponentType::is_input)
    }

    /// Returns all OUTPUT nodes in insertion order.
    pub fn output_nodes(&self) -> Vec<NodeId> {
        self.nodes_where(ComponentType::is_output)
    }

    fn nodes_where(&self, pred: impl Fn(&ComponentType) -> bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| pred(&n.component))
            .map(|n| n.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> CircuitGraph {
        let mut g = CircuitGraph::new();
        g.add_node("i1", ComponentType::Input).unwrap();
        g.add_node("a1", ComponentType::Add).unwrap();
        g.add_node("o1", ComponentType::Output).unwrap();
        g.add_edge("i1", "a1").unwrap();
        g.add_edge("a1", "o1").unwrap();
        g
    }

    #[test]
    fn empty_graph() {
        let g = CircuitGraph::new();
        assert!(g.is_empty());
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.output_nodes().is_empty());
    }

    #[test]
    fn add_nodes_assigns_sequential_ids() {
        let g = chain();
        let ids: Vec<u32> = g.nodes().map(NodeId::as_raw).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(g.node(NodeId::from_raw(1)).name, "a1");
        assert_eq!(g.find("o1"), Some(NodeId::from_raw(2)));
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = chain();
        let err = g.add_node("a1", ComponentType::Mul).unwrap_err();
        assert_eq!(err, TimingError::DuplicateNode { name: "a1".into() });
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.type_of("a1"), &ComponentType::Add);
    }

    #[test]
    fn edge_to_unknown_node_rejected() {
        let mut g = chain();
        let err = g.add_edge("ghost", "o1").unwrap_err();
        assert_eq!(err, TimingError::UnknownNode { name: "ghost".into() });
        let err = g.add_edge("i1", "nowhere").unwrap_err();
        assert_eq!(err, TimingError::UnknownNode { name: "nowhere".into() });
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn type_of_is_lenient() {
        let g = chain();
        assert_eq!(g.type_of("i1"), &ComponentType::Input);
        assert_eq!(g.type_of("never_declared"), &ComponentType::Unknown);
    }

    #[test]
    fn adjacency_both_directions() {
        let g = chain();
        let i1 = g.find("i1").unwrap();
        let a1 = g.find("a1").unwrap();
        let o1 = g.find("o1").unwrap();
        assert_eq!(g.successors(i1), &[a1]);
        assert_eq!(g.predecessors(o1), &[a1]);
        assert!(g.predecessors(i1).is_empty());
        assert!(g.has_edge(i1, a1));
        assert!(!g.has_edge(a1, i1));
    }

    #[test]
    fn repeated_edge_collapses() {
        let mut g = chain();
        let i1 = g.find("i1").unwrap();
        let a1 = g.find("a1").unwrap();
        assert!(!g.add_edge_ids(i1, a1));
        g.add_edge("i1", "a1").unwrap();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.successors(i1).len(), 1);
    }

    #[test]
    fn edges_iterator() {
        let g = chain();
        let edges: Vec<(u32, u32)> = g
            .edges()
            .map(|(f, t)| (f.as_raw(), t.as_raw()))
            .collect();
        assert_eq!(edges, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn inputs_and_outputs() {
        let mut g = chain();
        g.add_node("o2", ComponentType::Output).unwrap();
        assert_eq!(g.input_nodes(), vec![NodeId::from_raw(0)]);
        assert_eq!(
            g.output_nodes(),
            vec![NodeId::from_raw(2), NodeId::from_raw(3)]
        );
    }

    #[test]
    fn graph_serializes_nodes_and_adjacency() {
        let g = chain();
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["nodes"][1]["name"], "a1");
        assert_eq!(json["nodes"][1]["component"], "ADD");
        assert_eq!(json["successors"][0][0], 1);
        assert_eq!(json["edge_count"], 2);
    }

    #[test]
    fn graph_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CircuitGraph>();
    }
}
