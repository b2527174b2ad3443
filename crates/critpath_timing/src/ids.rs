//! Opaque ID newtype for circuit graph nodes.

use serde::{Deserialize, Serialize};

/// Opaque, copyable ID for a node in a [`CircuitGraph`](crate::CircuitGraph).
///
/// A thin `u32` arena index. IDs are assigned in insertion order, so
/// comparing two IDs compares when their nodes were added.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
