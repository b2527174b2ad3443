//! Critical path analysis over circuit dependency graphs.
//!
//! A circuit is a directed acyclic graph of typed components. Each component
//! type has a propagation delay, looked up in a [`DelayTable`]. The critical
//! path is the INPUT to OUTPUT path with the largest accumulated delay; it
//! bounds how fast the circuit can be clocked.
//!
//! # Usage
//!
//! ```
//! use critpath_timing::{CircuitGraph, ComponentType, CriticalPathAnalyzer};
//!
//! let mut graph = CircuitGraph::new();
//! graph.add_node("i1", ComponentType::Input).unwrap();
//! graph.add_node("a1", ComponentType::Add).unwrap();
//! graph.add_node("o1", ComponentType::Output).unwrap();
//! graph.add_edge("i1", "a1").unwrap();
//! graph.add_edge("a1", "o1").unwrap();
//!
//! let path = CriticalPathAnalyzer::default().find_critical_path(&graph).unwrap();
//! assert_eq!(path.node_names(), vec!["i1", "a1", "o1"]);
//! assert_eq!(path.total_delay, 1.0);
//! ```
//!
//! # Architecture
//!
//! - [`component`]: component types and the delay table
//! - [`graph`]: the circuit graph (named nodes plus producer to consumer edges)
//! - [`analyze`]: topological ordering and the longest-path search
//! - [`report`]: the critical path result type
//! - [`error`]: graph construction and analysis errors

#![warn(missing_docs)]

pub mod analyze;
pub mod component;
pub mod error;
pub mod graph;
pub mod ids;
pub mod report;

pub use analyze::{topological_order, CriticalPathAnalyzer};
pub use component::{ComponentType, DelayTable};
pub use error::TimingError;
pub use graph::{CircuitGraph, CircuitNode};
pub use ids::NodeId;
pub use report::{CriticalPath, PathElement};
