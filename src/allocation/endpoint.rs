//! Neighbor endpoint addressing.
//!
//! Neighbor ids are never written out directly. Each one is rendered as the
//! neighbor's TCP receiver address, `transport://host:(tcp_base + id)`, so the
//! id can be recovered by subtracting the shared base.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ports::{AllocationError, BasePorts, Resource};
use crate::topology::NodeId;

/// Match: "tcp://127.0.0.1:34001"
static ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)://([A-Za-z0-9.\-]+|\[[0-9A-Fa-f:]+\]):(\d{1,5})$")
        .expect("Invalid endpoint regex")
});

/// Errors that can occur when parsing an endpoint string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointParseError {
    #[error("malformed endpoint '{0}'")]
    Malformed(String),

    #[error("unknown transport '{0}'")]
    UnknownTransport(String),

    #[error("port out of range in endpoint '{0}'")]
    InvalidPort(String),
}

/// Transport used to reach a neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Tcp,
    Udp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Udp => "udp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Transport::Tcp),
            "udp" => Ok(Transport::Udp),
            other => Err(EndpointParseError::UnknownTransport(other.to_string())),
        }
    }
}

/// Network address of a node's receiver.
///
/// IPv6 hosts are stored bare and bracketed only when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Receiver endpoint of `node`, offset from the shared TCP base port
    pub fn for_node(
        transport: Transport,
        host: &str,
        base: &BasePorts,
        node: NodeId,
    ) -> Result<Self, AllocationError> {
        let port = base.value_for(Resource::TcpReceiver, node)?;
        Ok(Self {
            transport,
            host: host.to_string(),
            port: port as u16,
        })
    }

    /// Node id this endpoint belongs to, if the port lies in the TCP range
    pub fn node_id(&self, base: &BasePorts) -> Option<NodeId> {
        self.port.checked_sub(base.tcp).map(NodeId::from)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            write!(f, "{}://[{}]:{}", self.transport, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.transport, self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ENDPOINT_PATTERN
            .captures(s.trim())
            .ok_or_else(|| EndpointParseError::Malformed(s.to_string()))?;
        let transport = caps[1].parse::<Transport>()?;
        let port = caps[3]
            .parse::<u16>()
            .map_err(|_| EndpointParseError::InvalidPort(s.to_string()))?;
        let host = &caps[2];
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        Ok(Self {
            transport,
            host: host.to_string(),
            port,
        })
    }
}

impl Serialize for Endpoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
