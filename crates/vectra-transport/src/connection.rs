//! Outbound connection to a single peer

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use vectra_core::{NodeId, VectraError, VectraResult};
use vectra_wire::{Request, Response};

use crate::framing::{read_frame, write_frame};

/// A live outbound channel to exactly one peer.
///
/// Exclusively owned by the node (or driver) that opened it. Requests are
/// synchronous: one frame out, one frame back, in order.
pub struct PeerConnection {
    stream: TcpStream,
    /// Identity stamped into outgoing frame headers.
    local: NodeId,
    /// The peer this connection leads to.
    peer: NodeId,
    peer_addr: SocketAddr,
}

impl PeerConnection {
    /// Connect to `peer` at `addr` within `connect_timeout`.
    pub async fn connect(
        local: NodeId,
        peer: NodeId,
        addr: SocketAddr,
        connect_timeout: Duration,
    ) -> VectraResult<Self> {
        let stream = timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| VectraError::Timeout("connect"))?
            .map_err(|e| VectraError::ConnectionFailed(peer, e.to_string()))?;

        Ok(PeerConnection {
            stream,
            local,
            peer,
            peer_addr: addr,
        })
    }

    pub fn peer(&self) -> NodeId {
        self.peer
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Issue one request and wait for its response.
    ///
    /// A `Response::Error` from the peer is surfaced as `RemoteError`; a
    /// connection closed mid-call is a transport error. Either way the
    /// caller should consider this connection dead.
    pub async fn call(&mut self, request: Request) -> VectraResult<Response> {
        let frame = request.into_frame(self.local)?;
        write_frame(&mut self.stream, &frame).await?;

        let reply = read_frame(&mut self.stream)
            .await?
            .ok_or_else(|| VectraError::TransportError("Connection closed by peer".into()))?;

        match Response::from_frame(&reply)? {
            Response::Error(message) => Err(VectraError::RemoteError(message)),
            response => Ok(response),
        }
    }

    /// Lightweight liveness probe with a short bounded timeout.
    pub async fn ping(&mut self, ping_timeout: Duration) -> VectraResult<()> {
        let response = timeout(ping_timeout, self.call(Request::Ping))
            .await
            .map_err(|_| VectraError::Timeout("ping"))??;

        match response {
            Response::Pong => Ok(()),
            other => Err(VectraError::UnexpectedResponse(format!(
                "Expected Pong, got {:?}",
                other
            ))),
        }
    }
}
