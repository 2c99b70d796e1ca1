//! Typed driver-side client
//!
//! A driver (test harness, orchestrator, front end) talks to any node
//! through this wrapper instead of raw frames. It exposes exactly the five
//! remote operations plus the liveness ping - the full external surface.

use std::net::SocketAddr;
use std::time::Duration;

use vectra_core::{NodeId, NodeState, VectorClock, VectraError, VectraResult};
use vectra_wire::{Request, Response};

use crate::connection::PeerConnection;
use crate::pool::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};

/// Identity stamped on frames from callers that are not simulation
/// participants.
pub const DRIVER_ID: NodeId = NodeId(u16::MAX);

/// Driver connection to one node.
pub struct Client {
    conn: PeerConnection,
    request_timeout: Duration,
}

impl Client {
    /// Connect to the node listening at `addr`.
    pub async fn connect(node: NodeId, addr: SocketAddr) -> VectraResult<Self> {
        let conn = PeerConnection::connect(DRIVER_ID, node, addr, DEFAULT_CONNECT_TIMEOUT).await?;
        Ok(Client {
            conn,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// One bounded request/response exchange.
    async fn call(&mut self, request: Request) -> VectraResult<Response> {
        match tokio::time::timeout(self.request_timeout, self.conn.call(request)).await {
            Ok(result) => result,
            Err(_) => Err(VectraError::Timeout("call")),
        }
    }

    /// Trigger a local event on the node.
    pub async fn local_event(&mut self) -> VectraResult<()> {
        match self.call(Request::LocalEvent).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected("Ack", other)),
        }
    }

    /// Ask the node to send `text` to `target`. Returns the node's
    /// success flag.
    pub async fn send_message(&mut self, target: NodeId, text: &str) -> VectraResult<bool> {
        let request = Request::SendMessage {
            target,
            text: text.to_string(),
        };
        match self.call(request).await? {
            Response::SendResult(ok) => Ok(ok),
            other => Err(unexpected("SendResult", other)),
        }
    }

    /// Deliver a message to the node as if from `sender`. Drivers normally
    /// never call this directly; it exists for protocol-level testing.
    pub async fn receive_message(
        &mut self,
        sender: NodeId,
        text: &str,
        clock: VectorClock,
    ) -> VectraResult<()> {
        let request = Request::ReceiveMessage {
            sender,
            text: text.to_string(),
            clock,
        };
        match self.call(request).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected("Ack", other)),
        }
    }

    /// Fetch an immutable snapshot of the node's state.
    pub async fn get_state(&mut self) -> VectraResult<NodeState> {
        match self.call(Request::GetState).await? {
            Response::State(state) => Ok(state),
            other => Err(unexpected("State", other)),
        }
    }

    /// Ask the node to shut down.
    pub async fn shutdown(&mut self) -> VectraResult<()> {
        match self.call(Request::Shutdown).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected("Ack", other)),
        }
    }

    /// Probe the node for liveness.
    pub async fn ping(&mut self, timeout: Duration) -> VectraResult<()> {
        self.conn.ping(timeout).await
    }
}

fn unexpected(wanted: &str, got: Response) -> VectraError {
    VectraError::UnexpectedResponse(format!("Expected {}, got {:?}", wanted, got))
}
