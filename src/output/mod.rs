//! # Node Artifact Output Module
//!
//! This module turns node records into configuration artifacts and hands them
//! to a sink that stores them.
//!
//! ## Key Components
//!
//! - `settings.rs`: static node settings and the INI layout they sit in
//! - `format.rs`: INI and JSON renderers for a single record
//! - `sink.rs`: the `ConfigSink` trait plus directory and in-memory sinks
//!
//! ## Artifact Layout
//!
//! One artifact per node, named after the node identifier:
//!
//! ```text
//! many_configs/
//!   config0.ini
//!   config1.ini
//!   ...
//! ```
//!
//! The records themselves carry no formatting knowledge, so the same record
//! can be rendered as INI for the node binary or as JSON for tooling.

pub mod format;
pub mod settings;
pub mod sink;

pub use format::{render, ArtifactFormat};
pub use settings::{NodeSettings, SettingValue};
pub use sink::{ConfigSink, DirectorySink, MemorySink, SinkError};
