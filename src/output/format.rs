//! Artifact renderers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::settings::{LayoutLine, NodeSettings, NODE_LAYOUT};
use crate::node::NodeRecord;
use crate::topology::NodeId;

/// Prefix of the ZMQ ipc feed path; the node's ipc index is appended
pub const ZMQ_IPC_PREFIX: &str = "ipc://sbx/feeds/";

/// Artifact format written for each node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// `KEY = value` lines read by the node binary
    #[default]
    Ini,
    /// Structured JSON for tooling
    Json,
}

impl ArtifactFormat {
    pub const ALL: [ArtifactFormat; 2] = [ArtifactFormat::Ini, ArtifactFormat::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Ini => "ini",
            ArtifactFormat::Json => "json",
        }
    }

    /// Artifact file name for `node`, e.g. `config3.ini`
    pub fn file_name(&self, node: NodeId) -> String {
        format!("config{}.{}", node, self.extension())
    }

    /// Node id of an artifact file name in this format, e.g. `config3.ini` -> 3
    pub fn parse_file_name(&self, file_name: &str) -> Option<NodeId> {
        let id = file_name
            .strip_prefix("config")?
            .strip_suffix(self.extension())?
            .strip_suffix('.')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        id.parse().ok()
    }
}

/// ZMQ ipc feed address for an ipc index
pub fn zmq_ipc_address(index: u32) -> String {
    format!("{}{}", ZMQ_IPC_PREFIX, index)
}

/// Render `record` in the requested format
pub fn render(
    record: &NodeRecord,
    settings: &NodeSettings,
    format: ArtifactFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ArtifactFormat::Ini => Ok(render_ini(record, settings)),
        ArtifactFormat::Json => render_json(record, settings),
    }
}

/// Render the INI artifact: header line, then one `KEY = value` per layout line
pub fn render_ini(record: &NodeRecord, settings: &NodeSettings) -> String {
    let ports = &record.ports;
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "#NODE {} CONFIG", record.node());

    for line in NODE_LAYOUT {
        let (key, value) = match line {
            LayoutLine::Comment(text) => {
                let _ = writeln!(out, "{}", text);
                continue;
            }
            LayoutLine::Static(key, default) => {
                let value = settings.value(key).unwrap_or_else(|| default.to_string());
                (*key, value)
            }
            LayoutLine::ApiPort => ("API_PORT", ports.api_port.to_string()),
            LayoutLine::UdpReceiverPort => {
                ("UDP_RECEIVER_PORT", ports.udp_receiver_port.to_string())
            }
            LayoutLine::TcpReceiverPort => {
                ("TCP_RECEIVER_PORT", ports.tcp_receiver_port.to_string())
            }
            LayoutLine::Neighbors => ("NEIGHBORS", record.neighbors_joined()),
            LayoutLine::ZmqIpc => ("ZMQ_IPC", zmq_ipc_address(ports.zmq_ipc)),
            LayoutLine::ZmqPort => ("ZMQ_PORT", ports.zmq_port.to_string()),
        };
        let _ = writeln!(out, "{} = {}", key, value);
    }

    for (key, value) in settings.extra() {
        let _ = writeln!(out, "{} = {}", key, value);
    }

    out
}

#[derive(Serialize)]
struct JsonArtifact<'a> {
    #[serde(flatten)]
    record: &'a NodeRecord,
    zmq_ipc_address: String,
    settings: BTreeMap<String, String>,
}

/// Render the JSON artifact: the record fields plus resolved static settings
pub fn render_json(
    record: &NodeRecord,
    settings: &NodeSettings,
) -> Result<String, serde_json::Error> {
    let artifact = JsonArtifact {
        record,
        zmq_ipc_address: zmq_ipc_address(record.ports.zmq_ipc),
        settings: settings.resolved().into_iter().collect(),
    };
    serde_json::to_string_pretty(&artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{BasePorts, Endpoint, PortCounters, Transport};
    use crate::output::settings::SettingValue;

    fn record(node_offset: usize, neighbors: &[NodeId]) -> NodeRecord {
        let base = BasePorts::default();
        let mut counters = PortCounters::new(base);
        let mut ports = None;
        for _ in 0..=node_offset {
            let (block, next) = counters.allocate().unwrap();
            ports = Some(block);
            counters = next;
        }
        NodeRecord {
            ports: ports.unwrap(),
            neighbors: neighbors
                .iter()
                .map(|&n| Endpoint::for_node(Transport::Tcp, "127.0.0.1", &base, n).unwrap())
                .collect(),
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ArtifactFormat::Ini.file_name(3), "config3.ini");
        assert_eq!(ArtifactFormat::Json.file_name(0), "config0.json");
    }

    #[test]
    fn test_parse_file_names() {
        assert_eq!(ArtifactFormat::Ini.parse_file_name("config15.ini"), Some(15));
        assert_eq!(ArtifactFormat::Json.parse_file_name("config0.json"), Some(0));
        assert_eq!(ArtifactFormat::Ini.parse_file_name("config0.json"), None);
        assert_eq!(ArtifactFormat::Ini.parse_file_name("config.ini"), None);
        assert_eq!(ArtifactFormat::Ini.parse_file_name("config+1.ini"), None);
        assert_eq!(ArtifactFormat::Ini.parse_file_name("myconfig1.ini"), None);
        assert_eq!(ArtifactFormat::Ini.parse_file_name("config1ini"), None);
    }

    #[test]
    fn test_ini_layout() {
        let ini = render_ini(&record(2, &[1, 3]), &NodeSettings::new());
        let lines: Vec<&str> = ini.lines().collect();

        assert_eq!(lines[0], "#NODE 2 CONFIG");
        assert_eq!(lines[1], "API_PORT = 14002");
        assert_eq!(lines[2], "API_HOST = localhost");
        assert!(lines.contains(&"UDP_RECEIVER_PORT = 24002"));
        assert!(lines.contains(&"TCP_RECEIVER_PORT = 34002"));
        assert!(lines.contains(&"NEIGHBORS = tcp://127.0.0.1:34001,tcp://127.0.0.1:34003"));
        assert!(lines.contains(&"ZMQ_IPC = ipc://sbx/feeds/3"));
        assert!(lines.contains(&"ZMQ_PORT = 5552"));
        assert_eq!(lines.last(), Some(&"SAVELOG_XML_FILE = /logback-save.xml"));

        let pos = |key: &str| lines.iter().position(|l| l.starts_with(key)).unwrap();
        assert_eq!(lines[pos("MAX_BODY_LENGTH") + 1], "#REMOTE_AUTH =");
        assert_eq!(lines[pos("#REMOTE_AUTH") + 1], "MS_DELAY = 0");
        assert!(pos("MS_DELAY") < pos("UDP_RECEIVER_PORT"));
        assert!(pos("TCP_RECEIVER_PORT") < pos("NEIGHBORS"));
        assert!(pos("ZMQ_IPC") < pos("ZMQ_ENABLED"));
        assert!(pos("ZMQ_ENABLED") < pos("ZMQ_PORT"));
    }

    #[test]
    fn test_ini_empty_neighbors() {
        let ini = render_ini(&record(0, &[]), &NodeSettings::new());
        assert!(ini.lines().any(|l| l == "NEIGHBORS = "));
    }

    #[test]
    fn test_ini_overrides_and_extras() {
        let mut settings = NodeSettings::new();
        settings.set("ZMQ_ENABLED", SettingValue::Bool(true));
        settings.set("EXTRA_KEY", "value");
        let ini = render_ini(&record(0, &[1]), &settings);

        assert!(ini.lines().any(|l| l == "ZMQ_ENABLED = true"));
        assert_eq!(ini.lines().last(), Some("EXTRA_KEY = value"));
    }

    #[test]
    fn test_json_artifact() {
        let json = render(&record(1, &[0]), &NodeSettings::new(), ArtifactFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["node"], 1);
        assert_eq!(value["tcp_receiver_port"], 34001);
        assert_eq!(value["neighbors"][0], "tcp://127.0.0.1:34000");
        assert_eq!(value["zmq_ipc_address"], "ipc://sbx/feeds/2");
        assert_eq!(value["settings"]["DB_PATH"], "mainnetdb");
    }
}
