//! Overlay topology module.
//!
//! This module builds the logical peer-connectivity graph for a simulated
//! network and answers adjacency queries over it. The graph is drawn once per
//! run and is immutable afterwards.

pub mod small_world;
pub mod types;

// Re-export key types for easier access
pub use small_world::SmallWorldTopology;
pub use types::{NodeId, OverlayTopology, SmallWorldParams, TopologyError};
