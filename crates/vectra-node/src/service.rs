//! Node service facade
//!
//! The network-facing entry point. Exactly five operations (plus a ping)
//! are reachable remotely; each maps onto the pure `ProcessNode` under the
//! node's state lock.
//!
//! Lock discipline for SendMessage: the clock increment, snapshot, and
//! PREPARE record happen under the lock, then the lock is *released* before
//! the connection acquisition and remote call, and re-taken only to record
//! the outcome. A slow peer can therefore never block local events or state
//! polls.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{info, warn};

use vectra_core::NodeId;
use vectra_transport::PeerPool;
use vectra_wire::{Request, Response};

use crate::config::NodeConfig;
use crate::process::ProcessNode;

/// Shared per-node service state.
pub struct NodeService {
    id: NodeId,
    state: Mutex<ProcessNode>,
    /// Outbound connection cache; async mutex because calls through it
    /// await the network.
    pool: AsyncMutex<PeerPool>,
    shutdown: watch::Sender<bool>,
}

impl NodeService {
    /// Build the service and the shutdown signal the server loop watches.
    pub fn new(config: &NodeConfig) -> (Arc<Self>, watch::Receiver<bool>) {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let pool = PeerPool::new(config.id, config.base_addr, config.base_port).with_timeouts(
            config.ping_timeout,
            config.connect_timeout,
            config.request_timeout,
        );

        let service = Arc::new(NodeService {
            id: config.id,
            state: Mutex::new(ProcessNode::new(config.id, config.participants)),
            pool: AsyncMutex::new(pool),
            shutdown,
        });
        (service, shutdown_rx)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Dispatch one inbound request. Never panics, never kills the node:
    /// every failure is a response or a local log line.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::LocalEvent => {
                self.state.lock().local_event();
                Response::Ack
            }
            Request::SendMessage { target, text } => {
                Response::SendResult(self.send_message(target, &text).await)
            }
            Request::ReceiveMessage {
                sender,
                text,
                clock,
            } => {
                // Fire-and-forget from the sender's perspective: a
                // malformed clock is logged and dropped, never reported.
                if let Err(e) = self.state.lock().receive_message(sender, &text, &clock) {
                    warn!(node = %self.id, %sender, error = %e, "Discarding message");
                }
                Response::Ack
            }
            Request::GetState => Response::State(self.state.lock().snapshot()),
            Request::Shutdown => {
                self.shutdown().await;
                Response::Ack
            }
            Request::Ping => Response::Pong,
        }
    }

    /// Full send pipeline: mutate under the lock, deliver outside it,
    /// record the outcome back under the lock.
    pub async fn send_message(&self, target: NodeId, text: &str) -> bool {
        let snapshot = self.state.lock().prepare_send(target, text);
        let Some(clock) = snapshot else {
            return false;
        };

        let request = Request::ReceiveMessage {
            sender: self.id,
            text: text.to_string(),
            clock,
        };

        let result = self.pool.lock().await.call(target, request).await;
        let delivered = match result {
            Ok(Response::Ack) => true,
            Ok(other) => {
                warn!(node = %self.id, %target, response = ?other, "Unexpected delivery response");
                false
            }
            Err(e) => {
                warn!(node = %self.id, %target, error = %e, "Send failed");
                false
            }
        };

        self.state.lock().record_send_outcome(target, text, delivered);
        delivered
    }

    /// Close outbound connections and stop the server loop. Idempotent;
    /// clock and history are untouched.
    pub async fn shutdown(&self) {
        self.pool.lock().await.close_all();
        if !*self.shutdown.borrow() {
            info!(node = %self.id, "Shutdown requested");
        }
        let _ = self.shutdown.send(true);
    }
}
