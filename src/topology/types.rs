//! Topology type definitions.
//!
//! Node identifiers, small-world parameters, the error taxonomy for graph
//! construction and the trait every overlay topology implements.

use serde::{Deserialize, Serialize};

/// Dense node identifier in `[0, num_nodes)`.
///
/// The identifier doubles as the node's offset into every port range, so a
/// node's address can be computed from its id and the shared base port alone.
pub type NodeId = usize;

/// Errors raised while constructing or querying an overlay topology
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("topology requires at least one node")]
    NoNodes,

    #[error("neighbor count k={k} must be even")]
    OddNeighborCount { k: usize },

    #[error("neighbor count k={k} must be at least 2")]
    NeighborCountTooSmall { k: usize },

    #[error("neighbor count k={k} must be less than the number of nodes ({num_nodes})")]
    NeighborCountTooLarge { k: usize, num_nodes: usize },

    #[error("rewiring probability {p} is outside [0, 1]")]
    InvalidProbability { p: f64 },

    #[error("node {node} is out of range for a topology of {num_nodes} nodes")]
    NodeOutOfRange { node: NodeId, num_nodes: usize },
}

/// Watts-Strogatz parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmallWorldParams {
    /// Ring-lattice neighbor count per node before rewiring (even)
    pub k: usize,
    /// Probability that a lattice edge is rewired to a random node
    pub p: f64,
}

impl Default for SmallWorldParams {
    fn default() -> Self {
        Self { k: 8, p: 0.1 }
    }
}

impl SmallWorldParams {
    /// Check the construction preconditions for a graph of `num_nodes` vertices.
    ///
    /// A single-vertex graph has no lattice edges, so `k` is only checked
    /// against `num_nodes` when there is more than one node.
    pub fn check(&self, num_nodes: usize) -> Result<(), TopologyError> {
        if num_nodes == 0 {
            return Err(TopologyError::NoNodes);
        }
        if !(0.0..=1.0).contains(&self.p) {
            return Err(TopologyError::InvalidProbability { p: self.p });
        }
        if self.k % 2 != 0 {
            return Err(TopologyError::OddNeighborCount { k: self.k });
        }
        if self.k < 2 {
            return Err(TopologyError::NeighborCountTooSmall { k: self.k });
        }
        if num_nodes > 1 && self.k >= num_nodes {
            return Err(TopologyError::NeighborCountTooLarge { k: self.k, num_nodes });
        }
        Ok(())
    }
}

/// Read-only view of an overlay graph.
///
/// Implementations are built once and never mutated, so they can be shared
/// freely between neighbor queries.
pub trait OverlayTopology {
    /// Number of vertices in the graph
    fn num_nodes(&self) -> usize;

    /// Neighbors of `node` in ascending order.
    ///
    /// Never contains `node` itself. Returns an error for ids outside
    /// `[0, num_nodes)`.
    fn neighbors_of(&self, node: NodeId) -> Result<Vec<NodeId>, TopologyError>;
}
