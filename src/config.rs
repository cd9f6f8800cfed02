use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::allocation::{AllocationError, BasePorts, Transport};
use crate::output::{ArtifactFormat, NodeSettings};
use crate::topology::{SmallWorldParams, TopologyError};
use crate::utils::ip_utils::is_valid_host;

/// Default directory node artifacts are written to
pub const DEFAULT_OUTPUT_DIR: &str = "many_configs";

/// Top-level generator configuration that mirrors the YAML file.
///
/// Every section is optional; missing sections and keys fall back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub general: GeneralConfig,
    pub network: NetworkConfig,
    pub topology: TopologyConfig,
    pub ports: BasePorts,
    /// Static settings written into every node artifact
    pub node: NodeSettings,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        // Validate general settings
        if self.general.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "output_dir cannot be empty".to_string(),
            ));
        }
        if let Some(level) = &self.general.log_level {
            if level.parse::<log::LevelFilter>().is_err() {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}'",
                    level
                )));
            }
        }

        // Validate network settings
        if self.network.num_nodes == 0 {
            return Err(ValidationError::InvalidNetwork(
                "num_nodes must be at least 1".to_string(),
            ));
        }
        if !is_valid_host(&self.network.host) {
            return Err(ValidationError::InvalidNetwork(format!(
                "host '{}' is not a valid IP address or hostname",
                self.network.host
            )));
        }

        // Graph and port preconditions, checked before anything is built
        self.topology.params().check(self.network.num_nodes)?;
        self.ports.check_capacity(self.network.num_nodes)?;

        let reserved = self.node.reserved_keys();
        if !reserved.is_empty() {
            return Err(ValidationError::InvalidNode(format!(
                "per-node keys cannot be overridden: {}",
                reserved.join(", ")
            )));
        }

        Ok(())
    }
}

/// General generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GeneralConfig {
    /// Directory that receives one artifact per node
    pub output_dir: PathBuf,
    /// Artifact format
    pub format: ArtifactFormat,
    /// Replace artifacts an earlier run left in `output_dir`
    pub overwrite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Size and addressing of the simulated network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NetworkConfig {
    /// Number of nodes N; identifiers are `0..N`
    pub num_nodes: usize,
    /// Host every node listens on
    pub host: String,
    /// Transport used in neighbor endpoints
    pub transport: Transport,
}

/// Small-world overlay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TopologyConfig {
    /// Ring-lattice neighbors per node before rewiring (even)
    pub k: usize,
    /// Rewiring probability
    pub p: f64,
    /// Fixed RNG seed; a fresh random graph is drawn when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl TopologyConfig {
    pub fn params(&self) -> SmallWorldParams {
        SmallWorldParams {
            k: self.k,
            p: self.p,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(#[from] TopologyError),
    #[error("Invalid port configuration: {0}")]
    InvalidPorts(#[from] AllocationError),
    #[error("Invalid node settings: {0}")]
    InvalidNode(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: ArtifactFormat::Ini,
            overwrite: false,
            log_level: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_nodes: 10,
            host: "127.0.0.1".to_string(),
            transport: Transport::Tcp,
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        let params = SmallWorldParams::default();
        Self {
            k: params.k,
            p: params.p,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.num_nodes, 10);
        assert_eq!(config.topology.k, 8);
        assert_eq!(config.ports.tcp, 34000);
        assert_eq!(config.general.output_dir, PathBuf::from("many_configs"));
        assert!(!config.general.overwrite);
    }

    #[test]
    fn test_full_config_parsing() {
        let yaml = r#"
general:
  output_dir: "out"
  format: json
  overwrite: true
  log_level: debug
network:
  num_nodes: 10
  host: "10.0.0.1"
  transport: udp
topology:
  k: 4
  p: 0.1
  seed: 7
ports:
  api: 14000
  udp: 24000
  tcp: 34000
  ipc: 1
  zmq: 5550
node:
  MWM: 2
  ZMQ_ENABLED: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.format, ArtifactFormat::Json);
        assert!(config.general.overwrite);
        assert_eq!(config.network.transport, Transport::Udp);
        assert_eq!(config.topology.seed, Some(7));
        assert_eq!(config.node.value("MWM").as_deref(), Some("2"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
network:
  num_nodes: 20
ports:
  api: 15000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.network.num_nodes, 20);
        assert_eq!(config.network.host, "127.0.0.1");
        assert_eq!(config.ports.api, 15000);
        assert_eq!(config.ports.udp, 24000);
        assert_eq!(config.topology.p, 0.1);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let yaml = "network:\n  nodes: 5\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.network.num_nodes = 0;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidNetwork(_))));

        // N=6, k=6 violates k < N
        let mut config = Config::default();
        config.network.num_nodes = 6;
        config.topology.k = 6;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTopology(TopologyError::NeighborCountTooLarge { .. }))
        ));

        let mut config = Config::default();
        config.topology.k = 3;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTopology(_))));

        let mut config = Config::default();
        config.topology.p = -0.5;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTopology(_))));

        let mut config = Config::default();
        config.ports.api = 0;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPorts(_))));

        let mut config = Config::default();
        config.network.host = "not a host".to_string();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidNetwork(_))));

        let mut config = Config::default();
        config.general.log_level = Some("loud".to_string());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));

        let mut config = Config::default();
        config.node.set("NEIGHBORS", "tcp://1.2.3.4:1");
        assert!(matches!(config.validate(), Err(ValidationError::InvalidNode(_))));
    }

    #[test]
    fn test_single_node_is_valid() {
        let mut config = Config::default();
        config.network.num_nodes = 1;
        assert!(config.validate().is_ok());
    }
}
