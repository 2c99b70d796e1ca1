//! Node configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use vectra_core::{NodeId, VectraError, VectraResult};
use vectra_transport::pool::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PING_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};

/// Startup parameters for one node.
///
/// All nodes run on one machine and are addressed by port offset: node `i`
/// listens on `base_port + i`. The base address and participant count are
/// known to every participant a priori.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// This node's 0-based identity.
    pub id: NodeId,
    /// Total participant count N.
    pub participants: u16,
    /// Shared base port.
    pub base_port: u16,
    /// Shared base address.
    pub base_addr: IpAddr,
    /// Liveness probe timeout for cached connections.
    pub ping_timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Bound on one outbound request/response exchange.
    pub request_timeout: Duration,
}

impl NodeConfig {
    pub fn new(id: NodeId, participants: u16, base_port: u16) -> Self {
        NodeConfig {
            id,
            participants,
            base_port,
            base_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ping_timeout: DEFAULT_PING_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// The port this node listens on.
    pub fn port(&self) -> u16 {
        self.base_port + self.id.0
    }

    /// The address this node listens on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.base_addr, self.port())
    }

    pub fn validate(&self) -> VectraResult<()> {
        if self.participants == 0 {
            return Err(VectraError::InvalidConfig(
                "participant count must be at least 1".into(),
            ));
        }
        if self.id.0 >= self.participants {
            return Err(VectraError::InvalidConfig(format!(
                "node id {} out of range for {} participants",
                self.id.0, self.participants
            )));
        }
        // Every participant port base_port..base_port+N-1 must fit in u16.
        if self.base_port.checked_add(self.participants - 1).is_none() {
            return Err(VectraError::InvalidConfig(format!(
                "base port {} leaves no room for {} participants",
                self.base_port, self.participants
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_port_is_base_plus_id() {
        let config = NodeConfig::new(NodeId::new(2), 3, 18861);
        assert_eq!(config.port(), 18863);
    }

    #[test]
    fn test_validate_rejects_id_out_of_range() {
        assert!(NodeConfig::new(NodeId::new(3), 3, 18861).validate().is_err());
        assert!(NodeConfig::new(NodeId::new(0), 0, 18861).validate().is_err());
        assert!(NodeConfig::new(NodeId::new(2), 3, 18861).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_port_range_overflow() {
        // Highest port is base_port + N - 1; it must stay within u16.
        assert!(NodeConfig::new(NodeId::new(0), 3, 65534).validate().is_err());
        assert!(NodeConfig::new(NodeId::new(0), 3, 65533).validate().is_ok());
        assert!(NodeConfig::new(NodeId::new(0), 1, 65535).validate().is_ok());
    }
}
