//! In-process cluster of node servers

use std::net::SocketAddr;

use tracing::info;

use vectra_core::{NodeId, VectraResult};
use vectra_node::{spawn, NodeConfig, NodeHandle};
use vectra_transport::Client;

/// A running set of N nodes on `base_port..base_port+N`.
///
/// Each test should use its own base port; nodes are addressed by port
/// offset, so two clusters on the same base would collide.
pub struct Cluster {
    handles: Vec<NodeHandle>,
}

impl Cluster {
    /// Start `participants` nodes on consecutive ports.
    pub async fn spawn(participants: u16, base_port: u16) -> VectraResult<Self> {
        let mut handles = Vec::with_capacity(participants as usize);
        for id in 0..participants {
            let config = NodeConfig::new(NodeId::new(id), participants, base_port);
            handles.push(spawn(config).await?);
        }
        info!(participants, base_port, "Cluster up");
        Ok(Cluster { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn addr(&self, id: u16) -> SocketAddr {
        self.handles[id as usize].addr()
    }

    /// Open a fresh driver connection to node `id`.
    pub async fn client(&self, id: u16) -> VectraResult<Client> {
        Client::connect(NodeId::new(id), self.addr(id)).await
    }

    /// Stop a single node, e.g. to simulate a crashed peer.
    pub async fn stop_node(&mut self, id: u16) {
        self.handles[id as usize].shutdown().await;
    }

    /// Stop every node.
    pub async fn shutdown(mut self) {
        for handle in &mut self.handles {
            handle.shutdown().await;
        }
        info!("Cluster down");
    }
}
