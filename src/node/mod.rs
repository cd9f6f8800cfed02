//! Node configuration module.
//!
//! Turns an overlay topology into one configuration record per node, in
//! increasing identifier order.

pub mod configurator;
pub mod record;

pub use configurator::{generate_all, generate_node, ConfigureError, NodeConfigurator};
pub use record::NodeRecord;
