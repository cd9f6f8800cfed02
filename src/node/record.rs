//! Per-node configuration record.

use serde::Serialize;

use crate::allocation::{Endpoint, PortBlock};
use crate::topology::NodeId;

/// Everything one node needs to join the overlay: its own resource block and
/// the receiver endpoints of its neighbors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    #[serde(flatten)]
    pub ports: PortBlock,
    pub neighbors: Vec<Endpoint>,
}

impl NodeRecord {
    pub fn node(&self) -> NodeId {
        self.ports.node
    }

    /// Neighbor endpoints joined with commas; empty for an isolated node
    pub fn neighbors_joined(&self) -> String {
        self.neighbors
            .iter()
            .map(Endpoint::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
