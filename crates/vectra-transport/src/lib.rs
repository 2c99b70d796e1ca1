//! VECTRA Transport - TCP plumbing between nodes
//!
//! Nodes talk point-to-point over TCP, one synchronous request/response at
//! a time per connection. Outbound connections are cached per peer and
//! probed for liveness before reuse; inbound traffic arrives on connections
//! the peers opened, never on our outbound ones.

pub mod client;
pub mod connection;
pub mod framing;
pub mod pool;

pub use client::Client;
pub use connection::PeerConnection;
pub use framing::{read_frame, write_frame};
pub use pool::PeerPool;
