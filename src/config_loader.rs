use crate::allocation::Transport;
use crate::config::Config;
use crate::output::ArtifactFormat;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open config file '{}'", config_path.display()))?;

    // Parse the YAML content
    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse config file '{}'", config_path.display()))?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Command-line values that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub num_nodes: Option<usize>,
    pub k: Option<usize>,
    pub p: Option<f64>,
    pub seed: Option<u64>,
    pub api_port_start: Option<u16>,
    pub udp_receiver_port_start: Option<u16>,
    pub tcp_receiver_port_start: Option<u16>,
    pub zmq_ipc_start: Option<u32>,
    pub zmq_port_start: Option<u16>,
    pub host: Option<String>,
    pub transport: Option<Transport>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<ArtifactFormat>,
    pub overwrite: Option<bool>,
    pub log_level: Option<String>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(num_nodes) = overrides.num_nodes {
        config.network.num_nodes = num_nodes;
    }
    if let Some(host) = &overrides.host {
        config.network.host = host.clone();
    }
    if let Some(transport) = overrides.transport {
        config.network.transport = transport;
    }

    if let Some(k) = overrides.k {
        config.topology.k = k;
    }
    if let Some(p) = overrides.p {
        config.topology.p = p;
    }
    if let Some(seed) = overrides.seed {
        config.topology.seed = Some(seed);
    }

    if let Some(api) = overrides.api_port_start {
        config.ports.api = api;
    }
    if let Some(udp) = overrides.udp_receiver_port_start {
        config.ports.udp = udp;
    }
    if let Some(tcp) = overrides.tcp_receiver_port_start {
        config.ports.tcp = tcp;
    }
    if let Some(ipc) = overrides.zmq_ipc_start {
        config.ports.ipc = ipc;
    }
    if let Some(zmq) = overrides.zmq_port_start {
        config.ports.zmq = zmq;
    }

    if let Some(output_dir) = &overrides.output_dir {
        config.general.output_dir = output_dir.clone();
    }
    if let Some(format) = overrides.format {
        config.general.format = format;
    }
    if let Some(overwrite) = overrides.overwrite {
        config.general.overwrite = overwrite;
    }
    if let Some(level) = &overrides.log_level {
        config.general.log_level = Some(level.clone());
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

/// Build the effective configuration: defaults, then the optional YAML file,
/// then CLI overrides
pub fn resolve_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => {
            let file = File::open(path)
                .wrap_err_with(|| format!("Failed to open config file '{}'", path.display()))?;
            serde_yaml::from_reader(file)
                .wrap_err_with(|| format!("Failed to parse config file '{}'", path.display()))?
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, overrides)?;
    Ok(config)
}
