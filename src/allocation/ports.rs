//! Sequential port allocation.
//!
//! This file holds the base values for the five per-node resources and the
//! counter state that hands out one block per node in identifier order.

use serde::{Deserialize, Serialize};

use crate::topology::NodeId;

/// Errors that can occur while allocating per-node resources
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("base value for {resource} must be positive")]
    ZeroBase { resource: Resource },

    #[error("{resource} range starting at {base} cannot hold node {node} (max {max})")]
    RangeExhausted {
        resource: Resource,
        base: u32,
        node: NodeId,
        max: u32,
    },
}

/// The five resources allocated to every node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// HTTP API port
    Api,
    /// UDP receiver port
    UdpReceiver,
    /// TCP receiver port, also the address neighbors connect to
    TcpReceiver,
    /// Local-socket index for the ZMQ ipc feed
    ZmqIpc,
    /// ZMQ network port
    ZmqPort,
}

impl Resource {
    /// All resources in allocation order
    pub const ALL: [Resource; 5] = [
        Resource::Api,
        Resource::UdpReceiver,
        Resource::TcpReceiver,
        Resource::ZmqIpc,
        Resource::ZmqPort,
    ];

    /// Get the string representation of the resource
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Api => "api port",
            Resource::UdpReceiver => "udp receiver port",
            Resource::TcpReceiver => "tcp receiver port",
            Resource::ZmqIpc => "zmq ipc index",
            Resource::ZmqPort => "zmq port",
        }
    }

    /// Largest value the resource can take
    pub fn max_value(&self) -> u32 {
        match self {
            Resource::ZmqIpc => u32::MAX,
            _ => u32::from(u16::MAX),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting values for each resource range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BasePorts {
    pub api: u16,
    pub udp: u16,
    pub tcp: u16,
    pub ipc: u32,
    pub zmq: u16,
}

impl Default for BasePorts {
    fn default() -> Self {
        Self {
            api: 14000,
            udp: 24000,
            tcp: 34000,
            ipc: 1,
            zmq: 5550,
        }
    }
}

impl BasePorts {
    /// Base value of `resource`
    pub fn base(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Api => u32::from(self.api),
            Resource::UdpReceiver => u32::from(self.udp),
            Resource::TcpReceiver => u32::from(self.tcp),
            Resource::ZmqIpc => self.ipc,
            Resource::ZmqPort => u32::from(self.zmq),
        }
    }

    /// Value of `resource` for `node`: `base + node`
    pub fn value_for(&self, resource: Resource, node: NodeId) -> Result<u32, AllocationError> {
        let base = self.base(resource);
        let max = resource.max_value();
        u32::try_from(node)
            .ok()
            .and_then(|offset| base.checked_add(offset))
            .filter(|value| *value <= max)
            .ok_or(AllocationError::RangeExhausted {
                resource,
                base,
                node,
                max,
            })
    }

    /// Check that every base is positive and every range can hold `num_nodes` nodes
    pub fn check_capacity(&self, num_nodes: usize) -> Result<(), AllocationError> {
        for resource in Resource::ALL {
            if self.base(resource) == 0 {
                return Err(AllocationError::ZeroBase { resource });
            }
            if num_nodes > 0 {
                self.value_for(resource, num_nodes - 1)?;
            }
        }
        Ok(())
    }
}

/// Resources assigned to one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortBlock {
    pub node: NodeId,
    pub api_port: u16,
    pub udp_receiver_port: u16,
    pub tcp_receiver_port: u16,
    pub zmq_ipc: u32,
    pub zmq_port: u16,
}

impl PortBlock {
    /// Value of `resource` in this block
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Api => u32::from(self.api_port),
            Resource::UdpReceiver => u32::from(self.udp_receiver_port),
            Resource::TcpReceiver => u32::from(self.tcp_receiver_port),
            Resource::ZmqIpc => self.zmq_ipc,
            Resource::ZmqPort => u32::from(self.zmq_port),
        }
    }
}

/// Allocation state: the base values and the next node to receive a block.
///
/// `allocate` consumes the counters and returns the advanced state, so blocks
/// can only be handed out in increasing node order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCounters {
    base: BasePorts,
    next_node: NodeId,
}

impl PortCounters {
    pub fn new(base: BasePorts) -> Self {
        Self { base, next_node: 0 }
    }

    /// Base values the counters advance from
    pub fn base(&self) -> &BasePorts {
        &self.base
    }

    /// Node that the next call to `allocate` serves
    pub fn next_node(&self) -> NodeId {
        self.next_node
    }

    /// Allocate the block for `next_node` and return it with the advanced counters
    pub fn allocate(self) -> Result<(PortBlock, PortCounters), AllocationError> {
        let node = self.next_node;
        // Values validated against u16::MAX by value_for
        let port = |resource| self.base.value_for(resource, node).map(|v| v as u16);

        let block = PortBlock {
            node,
            api_port: port(Resource::Api)?,
            udp_receiver_port: port(Resource::UdpReceiver)?,
            tcp_receiver_port: port(Resource::TcpReceiver)?,
            zmq_ipc: self.base.value_for(Resource::ZmqIpc, node)?,
            zmq_port: port(Resource::ZmqPort)?,
        };

        let advanced = PortCounters {
            base: self.base,
            next_node: node + 1,
        };
        Ok((block, advanced))
    }
}
