//! TCP server loop for one node
//!
//! Accepts connections on `base_port + id` and serves framed requests,
//! one response per request, until shutdown. Peers and drivers use the
//! same protocol; a connection lives as long as its opener keeps it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vectra_core::{VectraError, VectraResult};
use vectra_transport::{read_frame, write_frame};
use vectra_wire::{Request, Response};

use crate::config::NodeConfig;
use crate::service::NodeService;

/// Handle to a running node server.
pub struct NodeHandle {
    addr: SocketAddr,
    service: Arc<NodeService>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

impl NodeHandle {
    /// The address the node is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn service(&self) -> &Arc<NodeService> {
        &self.service
    }

    /// Wait for the server loop to finish. Idempotent.
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Shut the node down and wait for the server loop to finish.
    pub async fn shutdown(&mut self) {
        self.service.shutdown().await;
        self.wait().await;
    }
}

/// Bind the listener and start the accept loop.
///
/// Binding can fail (port already in use); everything after that is
/// non-fatal to the node.
pub async fn spawn(config: NodeConfig) -> VectraResult<NodeHandle> {
    config.validate()?;

    let (service, mut shutdown_rx) = NodeService::new(&config);

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .map_err(|e| VectraError::TransportError(format!("Bind {} failed: {}", config.listen_addr(), e)))?;
    let addr = listener
        .local_addr()
        .map_err(|e| VectraError::TransportError(e.to_string()))?;

    info!(node = %config.id, %addr, participants = config.participants, "Node server started");

    let svc = Arc::clone(&service);
    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        debug!(node = %svc.id(), %peer_addr, "Connection established");
                        tokio::spawn(serve_connection(Arc::clone(&svc), stream, peer_addr));
                    }
                    Err(e) => {
                        warn!(node = %svc.id(), error = %e, "Accept failed");
                    }
                },
            }
        }
        info!(node = %svc.id(), "Server loop finished");
    });

    Ok(NodeHandle {
        addr,
        service,
        task: Some(task),
    })
}

/// Serve one inbound connection until its opener closes it, the framing
/// breaks, or the node shuts down.
async fn serve_connection(service: Arc<NodeService>, mut stream: TcpStream, peer_addr: SocketAddr) {
    loop {
        let frame = match read_frame(&mut stream).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                warn!(node = %service.id(), %peer_addr, error = %e, "Bad frame");
                let reply = Response::Error(e.to_string());
                if let Ok(reply) = reply.into_frame(service.id()) {
                    let _ = write_frame(&mut stream, &reply).await;
                }
                // Framing is broken; the stream cannot be trusted further.
                break;
            }
        };

        let response = match Request::from_frame(&frame) {
            Ok(request) => service.handle(request).await,
            Err(e) => {
                warn!(node = %service.id(), %peer_addr, error = %e, "Bad request");
                Response::Error(e.to_string())
            }
        };

        let reply = match response.into_frame(service.id()) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(node = %service.id(), error = %e, "Failed to encode response");
                break;
            }
        };
        if let Err(e) = write_frame(&mut stream, &reply).await {
            debug!(node = %service.id(), %peer_addr, error = %e, "Write failed");
            break;
        }

        if service.is_shutting_down() {
            break;
        }
    }
    debug!(node = %service.id(), %peer_addr, "Connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_core::NodeId;
    use vectra_transport::Client;

    // Single-node server tests; multi-node scenarios live in vectra-test.

    #[tokio::test]
    async fn test_spawn_serves_requests() {
        let config = NodeConfig::new(NodeId::new(0), 1, 47310);
        let mut handle = spawn(config).await.unwrap();

        let mut client = Client::connect(NodeId::new(0), handle.addr()).await.unwrap();
        client.local_event().await.unwrap();
        let state = client.get_state().await.unwrap();
        assert_eq!(state.clock.as_slice(), &[1]);
        assert_eq!(state.history, vec!["Local: VC=1".to_string()]);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_port_in_use_is_reported() {
        let config = NodeConfig::new(NodeId::new(0), 1, 47311);
        let mut first = spawn(config.clone()).await.unwrap();

        let err = spawn(config).await.unwrap_err();
        assert!(matches!(err, VectraError::TransportError(_)));

        first.shutdown().await;
    }

    #[tokio::test]
    async fn test_remote_shutdown_stops_server() {
        let config = NodeConfig::new(NodeId::new(0), 1, 47312);
        let mut handle = spawn(config).await.unwrap();

        let mut client = Client::connect(NodeId::new(0), handle.addr()).await.unwrap();
        client.shutdown().await.unwrap();
        handle.wait().await;

        assert!(handle.service().is_shutting_down());
    }
}
