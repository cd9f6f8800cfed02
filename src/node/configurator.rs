//! Node configurator.
//!
//! Walks node identifiers in increasing order, threading the port counters
//! through each step, and pairs every allocated block with the endpoints of
//! the node's overlay neighbors.

use log::{debug, warn};

use crate::allocation::{AllocationError, BasePorts, Endpoint, PortCounters, Transport};
use crate::topology::{NodeId, OverlayTopology, TopologyError};

use super::record::NodeRecord;

/// Errors that can occur while deriving node records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigureError {
    #[error("topology has {actual} nodes but {expected} records were requested")]
    NodeCountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Derive the record for `counters.next_node()` and return the advanced counters.
pub fn generate_node<T: OverlayTopology + ?Sized>(
    counters: PortCounters,
    topology: &T,
    transport: Transport,
    host: &str,
) -> Result<(NodeRecord, PortCounters), ConfigureError> {
    let (ports, advanced) = counters.allocate()?;
    let node = ports.node;

    let neighbor_ids = topology.neighbors_of(node)?;
    debug_assert!(!neighbor_ids.contains(&node), "node {} is its own neighbor", node);
    if neighbor_ids.is_empty() {
        warn!("Node {} has no overlay neighbors", node);
    }

    let neighbors = neighbor_ids
        .iter()
        .map(|&neighbor| Endpoint::for_node(transport, host, counters.base(), neighbor))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Node {}: {} neighbors, api port {}", node, neighbors.len(), ports.api_port);

    Ok((NodeRecord { ports, neighbors }, advanced))
}

/// Lazy, single-pass sequence of node records in identifier order.
///
/// Iteration stops after the first error; no record past a failure is produced.
pub struct NodeConfigurator<'a, T: OverlayTopology + ?Sized> {
    topology: &'a T,
    counters: PortCounters,
    num_nodes: usize,
    transport: Transport,
    host: String,
    failed: bool,
}

impl<'a, T: OverlayTopology + ?Sized> NodeConfigurator<'a, T> {
    pub fn new(
        num_nodes: usize,
        base: BasePorts,
        topology: &'a T,
        transport: Transport,
        host: impl Into<String>,
    ) -> Result<Self, ConfigureError> {
        if topology.num_nodes() != num_nodes {
            return Err(ConfigureError::NodeCountMismatch {
                expected: num_nodes,
                actual: topology.num_nodes(),
            });
        }
        base.check_capacity(num_nodes)?;

        Ok(Self {
            topology,
            counters: PortCounters::new(base),
            num_nodes,
            transport,
            host: host.into(),
            failed: false,
        })
    }

    /// Node the next record will be generated for
    pub fn next_node(&self) -> NodeId {
        self.counters.next_node()
    }
}

impl<T: OverlayTopology + ?Sized> Iterator for NodeConfigurator<'_, T> {
    type Item = Result<NodeRecord, ConfigureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.counters.next_node() >= self.num_nodes {
            return None;
        }
        match generate_node(self.counters, self.topology, self.transport, &self.host) {
            Ok((record, advanced)) => {
                self.counters = advanced;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.num_nodes.saturating_sub(self.counters.next_node());
        (0, Some(remaining))
    }
}

/// Records for every node of `topology`, addressed on `127.0.0.1` over TCP
pub fn generate_all<T: OverlayTopology + ?Sized>(
    num_nodes: usize,
    base: BasePorts,
    topology: &T,
) -> Result<NodeConfigurator<'_, T>, ConfigureError> {
    NodeConfigurator::new(num_nodes, base, topology, Transport::Tcp, "127.0.0.1")
}
