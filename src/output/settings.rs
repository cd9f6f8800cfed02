//! Static node settings.
//!
//! Every node artifact carries the same block of static settings around the
//! per-node values. The layout below fixes the order of all lines; the YAML
//! `node` section can override any static value or add new keys, which are
//! appended after the built-in ones.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single setting value as it appears in YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Integer(i) => write!(f, "{}", i),
            SettingValue::Float(x) => write!(f, "{}", x),
            SettingValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

/// One line of the node artifact layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutLine {
    /// Static setting with its built-in default
    Static(&'static str, &'static str),
    /// Commented-out line, written verbatim
    Comment(&'static str),
    ApiPort,
    UdpReceiverPort,
    TcpReceiverPort,
    Neighbors,
    ZmqIpc,
    ZmqPort,
}

use LayoutLine::*;

/// Line order of a node artifact
pub const NODE_LAYOUT: &[LayoutLine] = &[
    ApiPort,
    Static("API_HOST", "localhost"),
    Static(
        "REMOTE_LIMIT_API",
        "addNeighbors, getNeighbors, removeNeighbors, attachToTangle, interruptAttachingToTangle",
    ),
    Static("MAX_FIND_TRANSACTIONS", "100_000"),
    Static("MAX_REQUESTS_LIST", "1_000"),
    Static("MAX_GET_BYTES", "10_000"),
    Static("MAX_BODY_LENGTH", "1_000_000"),
    Comment("#REMOTE_AUTH ="),
    Static("MS_DELAY", "0"),
    UdpReceiverPort,
    TcpReceiverPort,
    Neighbors,
    Static("P_REMOVE_REQUEST", "0.01"),
    Static("SEND_LIMIT", "-1"),
    Static("MAX_PEERS", "0"),
    Static("DNS_REFRESHER_ENABLED", "true"),
    Static("DNS_RESOLUTION_ENABLED", "true"),
    Static("HXI_DIR", "hxi"),
    Static("DB_PATH", "mainnetdb"),
    Static("DB_LOG_PATH", "mainnet.log"),
    Static("DB_CACHE_SIZE", "100_000"),
    Static("ROCKS_DB", "rocksdb"),
    Static("REVALIDATE", "false"),
    Static("RESCAN_DB", "false"),
    Static("P_REPLY_RANDOM_TIP", "0.66"),
    Static("P_DROP_TRANSACTION", "0.0"),
    Static("P_SELECT_MILESTONE_CHILD", "0.7"),
    Static("P_SEND_MILESTONE", "0.02"),
    Static("P_PROPAGATE_REQUEST", "0.01"),
    Static("MWM", "1"),
    Static("PACKET_SIZE", "1200"),
    Static("REQ_HASH_SIZE", "32"),
    Static("QUEUE_SIZE", "1_000"),
    Static("P_DROP_CACHE_ENTRY", "0.02"),
    Static("CACHE_SIZE_BYTES", "150_000"),
    Static("ZMQ_THREADS", "1"),
    ZmqIpc,
    Static("ZMQ_ENABLED", "false"),
    ZmqPort,
    Static("GRAPH_ENABLED", "false"),
    Static("MAX_DEPTH", "15"),
    Static("ALPHA", "0.001"),
    Static("TIP_SOLIDIFIER_ENABLED", "true"),
    Static("POW_THREADS", "0"),
    Static(
        "COORDINATOR_ADDRESS",
        "6a8413edc634e948e3446806afde11b17e0e188faf80a59a8b1147a0600cc5db",
    ),
    Static("LOCAL_SNAPSHOTS_ENABLED", "true"),
    Static("LOCAL_SNAPSHOTS_PRUNING_ENABLED", "true"),
    Static("LOCAL_SNAPSHOTS_PRUNING_DELAY", "50000"),
    Static("LOCAL_SNAPSHOTS_INTERVAL_SYNCED", "10"),
    Static("LOCAL_SNAPSHOTS_INTERVAL_UNSYNCED", "1000"),
    Static("LOCAL_SNAPSHOTS_BASE_PATH", "mainnet"),
    Static("LOCAL_SNAPSHOTS_DEPTH", "100"),
    Static("SNAPSHOT_FILE", "/snapshotMainnet.txt"),
    Static("SNAPSHOT_SIG_FILE", "/snapshotMainnet.sig"),
    Static(
        "PREVIOUS_EPOCHS_SPENT_ADDRESSES_TXT",
        "/previousEpochsSpentAddresses.txt",
    ),
    Static(
        "PREVIOUS_EPOCHS_SPENT_ADDRESSES_SIG",
        "/previousEpochsSpentAddresses.sig",
    ),
    Static("GLOBAL_SNAPSHOT_TIME", "1522235533"),
    Static("MILESTONE_START_INDEX", "0"),
    Static("NUM_KEYS_IN_MILESTONE", "10"),
    Static("MAX_ANALYZED_TXS", "20_000"),
    Static("SAVELOG", "true"),
    Static("SAVELOG_BASE_PATH", "logs/"),
    Static("SAVELOG_XML_FILE", "/logback-save.xml"),
];

/// Keys produced per node; these cannot be overridden
pub const DYNAMIC_KEYS: &[&str] = &[
    "API_PORT",
    "UDP_RECEIVER_PORT",
    "TCP_RECEIVER_PORT",
    "NEIGHBORS",
    "ZMQ_IPC",
    "ZMQ_PORT",
];

/// Static settings shared by every node, keyed by upper-case setting name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeSettings {
    overrides: BTreeMap<String, SettingValue>,
}

impl NodeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override (or add) a static setting
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.overrides.insert(key.into(), value.into());
    }

    /// Keys that collide with per-node values
    pub fn reserved_keys(&self) -> Vec<&str> {
        self.overrides
            .keys()
            .map(String::as_str)
            .filter(|key| DYNAMIC_KEYS.contains(key))
            .collect()
    }

    /// Value of a static setting, taking overrides into account
    pub fn value(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.to_string());
        }
        NODE_LAYOUT.iter().find_map(|line| match line {
            Static(k, default) if *k == key => Some(default.to_string()),
            _ => None,
        })
    }

    /// Overrides whose keys are not part of the built-in layout, in key order
    pub fn extra(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.overrides
            .iter()
            .filter(|(key, _)| {
                !NODE_LAYOUT
                    .iter()
                    .any(|line| matches!(line, Static(k, _) if *k == key.as_str()))
                    && !DYNAMIC_KEYS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.as_str(), value))
    }

    /// All static settings in layout order, followed by extra keys
    pub fn resolved(&self) -> Vec<(String, String)> {
        let mut resolved: Vec<(String, String)> = NODE_LAYOUT
            .iter()
            .filter_map(|line| match line {
                Static(key, _) => self.value(key).map(|v| (key.to_string(), v)),
                _ => None,
            })
            .collect();
        resolved.extend(self.extra().map(|(k, v)| (k.to_string(), v.to_string())));
        resolved
    }
}
