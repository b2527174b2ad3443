//! The critical path result type.

use crate::component::ComponentType;
use critpath_common::Frequency;
use serde::{Deserialize, Serialize};

/// One node along a critical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    /// Node name.
    pub node: String,
    /// Component type of the node.
    pub component: ComponentType,
    /// The node's own delay from the delay table.
    pub delay: f64,
    /// Sum of delays from the start of the path through this node.
    pub cumulative: f64,
}

/// The longest-delay INPUT to OUTPUT path of a circuit.
///
/// `total_delay` is the arrival time at the terminal OUTPUT node: the sum of
/// the delays of every node before it. With the usual zero OUTPUT delay this
/// equals the last element's `cumulative` value.
///
/// The default value is the empty path with zero delay, the defined result
/// for a circuit that could not be analyzed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Path nodes from source to terminal.
    pub elements: Vec<PathElement>,
    /// Arrival time at the terminal node, in time units.
    pub total_delay: f64,
}

impl CriticalPath {
    /// Returns `true` for the empty path.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the number of nodes on the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns the node names in path order.
    pub fn node_names(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.node.as_str()).collect()
    }

    /// Returns the name of the first node on the path.
    pub fn source(&self) -> Option<&str> {
        self.elements.first().map(|e| e.node.as_str())
    }

    /// Returns the name of the terminal OUTPUT node.
    pub fn terminal(&self) -> Option<&str> {
        self.elements.last().map(|e| e.node.as_str())
    }

    /// Returns `true` if `node` lies on the path.
    pub fn contains(&self, node: &str) -> bool {
        self.elements.iter().any(|e| e.node == node)
    }

    /// Returns consecutive `(from, to)` node-name pairs along the path.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.elements
            .windows(2)
            .map(|w| (w[0].node.as_str(), w[1].node.as_str()))
    }

    /// Returns the highest clock frequency this path allows when one time
    /// unit lasts `unit_ns` nanoseconds.
    ///
    /// `None` for a zero-delay path.
    pub fn max_frequency(&self, unit_ns: f64) -> Option<Frequency> {
        Frequency::from_period_ns(self.total_delay * unit_ns)
    }

    /// Returns whether a clock at `target` leaves enough time for this path,
    /// and the slack in time units (negative when violated).
    pub fn check_target(&self, target: Frequency, unit_ns: f64) -> (bool, f64) {
        let budget = target.period_ns() / unit_ns;
        let slack = budget - self.total_delay;
        (slack >= 0.0, slack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &str, component: ComponentType, delay: f64, cumulative: f64) -> PathElement {
        PathElement {
            node: node.to_string(),
            component,
            delay,
            cumulative,
        }
    }

    fn sample() -> CriticalPath {
        CriticalPath {
            elements: vec![
                element("i1", ComponentType::Input, 0.0, 0.0),
                element("a1", ComponentType::Add, 1.0, 1.0),
                element("a2", ComponentType::Add, 1.0, 2.0),
                element("o1", ComponentType::Output, 0.0, 2.0),
            ],
            total_delay: 2.0,
        }
    }

    #[test]
    fn default_is_empty_zero() {
        let p = CriticalPath::default();
        assert!(p.is_empty());
        assert_eq!(p.total_delay, 0.0);
        assert!(p.source().is_none());
        assert!(p.max_frequency(1.0).is_none());
    }

    #[test]
    fn accessors() {
        let p = sample();
        assert_eq!(p.len(), 4);
        assert_eq!(p.node_names(), vec!["i1", "a1", "a2", "o1"]);
        assert_eq!(p.source(), Some("i1"));
        assert_eq!(p.terminal(), Some("o1"));
        assert!(p.contains("a2"));
        assert!(!p.contains("m1"));
        let edges: Vec<_> = p.edges().collect();
        assert_eq!(edges, vec![("i1", "a1"), ("a1", "a2"), ("a2", "o1")]);
    }

    #[test]
    fn max_frequency_from_delay() {
        // 2.0 units of 5ns = 10ns period = 100MHz
        let f = sample().max_frequency(5.0).unwrap();
        assert!((f.mhz() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn target_check() {
        let p = sample();
        let (met, slack) = p.check_target(Frequency::new(50_000_000.0), 5.0);
        // 20ns budget = 4 units, path takes 2
        assert!(met);
        assert!((slack - 2.0).abs() < 1e-9);

        let (met, slack) = p.check_target(Frequency::new(200_000_000.0), 5.0);
        assert!(!met);
        assert!((slack + 1.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_component_keywords() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["elements"][1]["component"], "ADD");
        assert_eq!(json["total_delay"], 2.0);
    }
}
