//! # Overlaysim - Configuration generator for simulated peer-to-peer overlays
//!
//! This library builds a random small-world overlay over `N` nodes and derives
//! one deployment configuration per node: its network endpoints plus the
//! receiver addresses of its overlay neighbors.
//!
//! ## Overview
//!
//! A run is one-shot and strictly sequential:
//!
//! 1. **Validate** the configuration (node count, `k`, `p`, base ports)
//! 2. **Draw** a Watts-Strogatz graph over node ids `0..N`
//! 3. **Allocate** five resources per node, each `base + id`
//! 4. **Translate** neighbor ids to `transport://host:(tcp_base + id)`
//! 5. **Store** one artifact per node through a sink
//!
//! ## Architecture
//!
//! - `topology`: small-world graph construction and adjacency queries
//! - `allocation`: per-node port blocks and neighbor endpoint addressing
//! - `node`: the configurator that pairs port blocks with neighbor endpoints
//! - `output`: INI/JSON renderers and artifact sinks
//! - `config` / `config_loader`: YAML configuration, CLI overrides, validation
//! - `orchestrator`: one complete generation run
//! - `utils`: node state cleanup, log bucketing, host validation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use overlaysim::{config::Config, orchestrator};
//!
//! let mut config = Config::default();
//! config.network.num_nodes = 10;
//! config.topology.k = 4;
//! config.topology.seed = Some(42);
//!
//! // Writes many_configs/config0.ini .. config9.ini
//! let summary = orchestrator::generate_network_configs(&config)?;
//! assert_eq!(summary.num_nodes, 10);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   output_dir: "many_configs"
//!   format: ini            # or json
//!   overwrite: false       # replace artifacts of an earlier run
//!
//! network:
//!   num_nodes: 10
//!   host: "127.0.0.1"
//!
//! topology:
//!   k: 4                   # even, less than num_nodes
//!   p: 0.1
//!   seed: 42               # optional
//!
//! ports:
//!   api: 14000
//!   udp: 24000
//!   tcp: 34000
//!   ipc: 1
//!   zmq: 5550
//!
//! node:
//!   ZMQ_ENABLED: true      # static node settings
//! ```
//!
//! ## Error Handling
//!
//! Domain modules return typed `thiserror` errors; the orchestrator and the
//! configuration loader wrap them in `color_eyre` reports with context.

pub mod allocation;
pub mod config;
pub mod config_loader;
pub mod node;
pub mod orchestrator;
pub mod output;
pub mod topology;
pub mod utils;
