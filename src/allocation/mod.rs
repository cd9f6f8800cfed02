//! Port and address allocation module.
//!
//! Every node receives one value from each of five sequential resource ranges
//! (API port, UDP receiver port, TCP receiver port, ZMQ ipc index, ZMQ port).
//! A node's offset into every range equals its identifier, which is what lets
//! any node compute a neighbor's receiver endpoint from the neighbor id and the
//! shared TCP base port.

pub mod endpoint;
pub mod ports;

// Re-export commonly used types
pub use endpoint::{Endpoint, EndpointParseError, Transport};
pub use ports::{AllocationError, BasePorts, PortBlock, PortCounters, Resource};
