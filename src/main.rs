use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use overlaysim::allocation::Transport;
use overlaysim::config_loader::{self, CliOverrides};
use overlaysim::orchestrator;
use overlaysim::output::ArtifactFormat;
use overlaysim::utils::{clean_node_state, log_organizer, organize_logs};

/// Configuration generator for simulated peer-to-peer overlay networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a small-world overlay and write one configuration per node
    Generate(GenerateArgs),

    /// Remove databases, snapshots and database logs from a node directory
    Clean {
        /// Node working directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Move dated log files into per-date subdirectories
    OrganizeLogs {
        /// Logs directory
        #[arg(long, default_value = log_organizer::DEFAULT_LOGS_DIR)]
        dir: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct GenerateArgs {
    /// Path to an optional generator configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of nodes
    #[arg(long)]
    num_nodes: Option<usize>,

    /// Ring-lattice neighbors per node before rewiring (even)
    #[arg(short, long)]
    k: Option<usize>,

    /// Probability of rewiring each lattice edge
    #[arg(short, long)]
    p: Option<f64>,

    /// Seed for a reproducible overlay
    #[arg(long)]
    seed: Option<u64>,

    /// API port to start iterating at
    #[arg(long)]
    api_port_start: Option<u16>,

    /// UDP receiver port to start iterating at
    #[arg(long)]
    udp_receiver_port_start: Option<u16>,

    /// TCP receiver port to start iterating at
    #[arg(long)]
    tcp_receiver_port_start: Option<u16>,

    /// ZMQ ipc index to start iterating at
    #[arg(long)]
    zmq_ipc_start: Option<u32>,

    /// ZMQ port to start iterating at
    #[arg(long)]
    zmq_port_start: Option<u16>,

    /// Host the nodes listen on
    #[arg(long)]
    host: Option<String>,

    /// Transport used in neighbor endpoints
    #[arg(long, value_enum)]
    transport: Option<Transport>,

    /// Output directory for node configurations
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Artifact format
    #[arg(long, value_enum)]
    format: Option<ArtifactFormat>,

    /// Replace artifacts left in the output directory by an earlier run
    #[arg(long)]
    overwrite: bool,
}

impl GenerateArgs {
    fn overrides(&self, log_level: Option<&str>) -> CliOverrides {
        CliOverrides {
            num_nodes: self.num_nodes,
            k: self.k,
            p: self.p,
            seed: self.seed,
            api_port_start: self.api_port_start,
            udp_receiver_port_start: self.udp_receiver_port_start,
            tcp_receiver_port_start: self.tcp_receiver_port_start,
            zmq_ipc_start: self.zmq_ipc_start,
            zmq_port_start: self.zmq_port_start,
            host: self.host.clone(),
            transport: self.transport,
            output_dir: self.output.clone(),
            format: self.format,
            overwrite: self.overwrite.then_some(true),
            log_level: log_level.map(str::to_string),
        }
    }
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialize logging; RUST_LOG takes precedence over `level`
fn init_logging(level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    match &args.command {
        Command::Generate(generate) => {
            let overrides = generate.overrides(args.log_level.as_deref());
            let config = config_loader::resolve_config(generate.config.as_deref(), &overrides)?;

            // The YAML log level applies when --log-level is not given
            init_logging(config.general.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            if let Some(path) = &generate.config {
                info!("Configuration file: {:?}", path);
            }
            info!(
                "Generating {} node configurations (k={}, p={}) into {:?}",
                config.network.num_nodes,
                config.topology.k,
                config.topology.p,
                config.general.output_dir
            );
            if config.topology.seed.is_none() {
                info!("No seed given; the overlay will differ on every run");
            }

            let summary = orchestrator::generate_network_configs(&config)?;
            info!(
                "Configuration generation completed: {} nodes, {} edges",
                summary.num_nodes, summary.edges
            );
        }
        Command::Clean { dir } => {
            init_logging(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            info!("Cleaning node state in {:?}", dir);
            let report = clean_node_state(dir);
            info!(
                "Removed {} target(s), {} already absent",
                report.removed.len(),
                report.missing.len()
            );
            if !report.is_clean() {
                for (path, e) in &report.failed {
                    warn!("Could not remove {}: {}", path.display(), e);
                }
                return Err(eyre!("{} cleanup target(s) could not be removed", report.failed.len()));
            }
        }
        Command::OrganizeLogs { dir } => {
            init_logging(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            let report = organize_logs(dir)?;
            for path in &report.skipped {
                warn!("Skipped {} (no date token)", path.display());
            }
        }
    }

    Ok(())
}
