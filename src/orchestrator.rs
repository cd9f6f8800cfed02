//! Configuration orchestrator.
//!
//! This module coordinates one generation run: validate the configuration,
//! draw the overlay graph, derive every node record in identifier order, and
//! hand the records to a sink.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};

use crate::config::Config;
use crate::node::{NodeConfigurator, NodeRecord};
use crate::output::{ConfigSink, DirectorySink};
use crate::topology::{NodeId, SmallWorldTopology};

/// Outcome of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub num_nodes: usize,
    pub edges: usize,
    /// Nodes that ended up with no neighbors after rewiring
    pub isolated_nodes: Vec<NodeId>,
    pub artifacts_written: usize,
    /// Artifacts of an earlier run removed because this run did not rewrite them
    pub stale_removed: usize,
}

/// Draw the overlay and derive all node records without storing them
pub fn build_records(config: &Config) -> Result<(SmallWorldTopology, Vec<NodeRecord>)> {
    config.validate()?;

    let num_nodes = config.network.num_nodes;
    let topology =
        SmallWorldTopology::construct_seeded(num_nodes, config.topology.params(), config.topology.seed)
            .wrap_err("Failed to construct overlay topology")?;

    let records = NodeConfigurator::new(
        num_nodes,
        config.ports,
        &topology,
        config.network.transport,
        config.network.host.as_str(),
    )?
    .collect::<Result<Vec<_>, _>>()
    .wrap_err("Failed to derive node records")?;

    Ok((topology, records))
}

/// Run generation against any sink.
///
/// All records are derived before the first one is stored, so a topology or
/// allocation failure leaves the sink untouched.
pub fn generate_into<S: ConfigSink + ?Sized>(config: &Config, sink: &mut S) -> Result<GenerationSummary> {
    let (topology, records) = build_records(config)?;

    info!(
        "All {} nodes share host {}; their port ranges must be free there",
        records.len(),
        config.network.host
    );

    let mut isolated_nodes = Vec::new();
    for record in &records {
        if record.neighbors.is_empty() {
            isolated_nodes.push(record.node());
        }
        sink.store(record)
            .wrap_err_with(|| format!("Failed to store configuration for node {}", record.node()))?;
    }

    if !isolated_nodes.is_empty() {
        warn!("{} node(s) have no overlay neighbors: {:?}", isolated_nodes.len(), isolated_nodes);
    }

    let summary = GenerationSummary {
        num_nodes: records.len(),
        edges: topology.edge_count(),
        isolated_nodes,
        artifacts_written: records.len(),
        stale_removed: 0,
    };
    info!(
        "Generated {} node configurations over {} overlay edges",
        summary.num_nodes, summary.edges
    );
    Ok(summary)
}

/// Run generation and write one artifact per node into the configured output directory.
///
/// An output directory holding artifacts of an earlier run is refused unless
/// `general.overwrite` is set; with it, leftovers this run did not rewrite are
/// removed once every record is stored.
pub fn generate_network_configs(config: &Config) -> Result<GenerationSummary> {
    // Validate before touching the filesystem
    config.validate()?;

    let mut sink = DirectorySink::new(
        &config.general.output_dir,
        config.general.format,
        config.node.clone(),
        config.general.overwrite,
    )?;
    let mut summary = generate_into(config, &mut sink)?;
    summary.stale_removed = sink.remove_stale()?.len();

    info!(
        "Wrote {} artifacts to {:?}",
        sink.written().len(),
        sink.dir()
    );
    Ok(summary)
}
