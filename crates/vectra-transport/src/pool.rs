//! Per-node cache of outbound peer connections
//!
//! Peer `i` listens at `base_addr:base_port + i` - the address space is the
//! only thing nodes share a priori. Connections are opened lazily, reused
//! across sends, probed before reuse, and discarded on the first sign of
//! death. The cache is owned by its node; there is no global registry.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use vectra_core::{NodeId, VectraError, VectraResult};
use vectra_wire::{Request, Response};

use crate::connection::PeerConnection;

/// Default liveness probe timeout.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(500);

/// Default connection establishment timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on one request/response exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection cache for one node's outbound traffic.
pub struct PeerPool {
    local: NodeId,
    base_addr: IpAddr,
    base_port: u16,
    connections: HashMap<NodeId, PeerConnection>,
    ping_timeout: Duration,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl PeerPool {
    pub fn new(local: NodeId, base_addr: IpAddr, base_port: u16) -> Self {
        PeerPool {
            local,
            base_addr,
            base_port,
            connections: HashMap::new(),
            ping_timeout: DEFAULT_PING_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeouts(
        mut self,
        ping_timeout: Duration,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        self.ping_timeout = ping_timeout;
        self.connect_timeout = connect_timeout;
        self.request_timeout = request_timeout;
        self
    }

    /// The well-known address of a peer: shared base plus identity offset.
    pub fn peer_addr(&self, peer: NodeId) -> SocketAddr {
        SocketAddr::new(self.base_addr, self.base_port + peer.0)
    }

    /// Whether a connection to `peer` is currently cached.
    pub fn is_cached(&self, peer: NodeId) -> bool {
        self.connections.contains_key(&peer)
    }

    /// Issue one request to `peer`, connecting or reconnecting as needed.
    ///
    /// The whole exchange is bounded by `request_timeout`; a peer that
    /// accepts but never answers yields `Timeout`, not a hang. On any call
    /// failure the cached connection is discarded so the next attempt
    /// re-establishes it; the error itself propagates to the caller and is
    /// never fatal to the node.
    pub async fn call(&mut self, peer: NodeId, request: Request) -> VectraResult<Response> {
        let request_timeout = self.request_timeout;
        let result = {
            let conn = self.get(peer).await?;
            match timeout(request_timeout, conn.call(request)).await {
                Ok(result) => result,
                Err(_) => Err(VectraError::Timeout("call")),
            }
        };

        if result.is_err() {
            self.connections.remove(&peer);
        }
        result
    }

    /// Get a live connection to `peer`, reusing the cache when the cached
    /// entry still answers a ping.
    async fn get(&mut self, peer: NodeId) -> VectraResult<&mut PeerConnection> {
        if peer == self.local {
            warn!(node = %self.local, "Cannot connect to self");
            return Err(VectraError::InvalidTarget(peer));
        }

        let ping_timeout = self.ping_timeout;
        let alive = match self.connections.get_mut(&peer) {
            Some(conn) => match conn.ping(ping_timeout).await {
                Ok(()) => {
                    debug!(node = %self.local, %peer, "Reusing cached connection");
                    true
                }
                Err(e) => {
                    warn!(node = %self.local, %peer, error = %e, "Cached connection dead, reconnecting");
                    false
                }
            },
            None => false,
        };

        if !alive {
            self.connections.remove(&peer);
            let addr = self.peer_addr(peer);
            debug!(node = %self.local, %peer, %addr, "Connecting");
            let conn =
                PeerConnection::connect(self.local, peer, addr, self.connect_timeout).await?;
            info!(node = %self.local, %peer, %addr, "Connected");
            self.connections.insert(peer, conn);
        }

        Ok(self.connections.get_mut(&peer).expect("present after insert"))
    }

    /// Close every outbound connection. Idempotent; dropping the streams
    /// closes the sockets.
    pub fn close_all(&mut self) {
        for peer in self.connections.keys() {
            info!(node = %self.local, %peer, "Closing connection");
        }
        self.connections.clear();
    }
}
